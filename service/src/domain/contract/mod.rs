//! [`Contract`] definitions.

pub mod lease;
pub mod mandate;

use common::{define_kind, unit, DateOf, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::property;
#[cfg(doc)]
use crate::domain::Property;

pub use self::{lease::Lease, mandate::Mandate};

/// Contract over a [`Property`].
#[derive(Clone, Debug, From)]
pub enum Contract {
    #[doc(hidden)]
    Mandate(Mandate),
    #[doc(hidden)]
    Lease(Lease),
}

impl Contract {
    /// Returns ID of this [`Contract`].
    #[must_use]
    pub fn id(&self) -> Id {
        match self {
            Self::Mandate(c) => c.id,
            Self::Lease(c) => c.id,
        }
    }

    /// Returns [`Kind`] of this [`Contract`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Mandate(_) => Kind::Mandate,
            Self::Lease(_) => Kind::Lease,
        }
    }

    /// Returns ID of the [`Property`] this [`Contract`] is over.
    #[must_use]
    pub fn property_id(&self) -> property::Id {
        match self {
            Self::Mandate(c) => c.property_id,
            Self::Lease(c) => c.property_id,
        }
    }

    /// Returns the monthly canon agreed in this [`Contract`].
    #[must_use]
    pub fn canon(&self) -> Money {
        match self {
            Self::Mandate(c) => c.canon,
            Self::Lease(c) => c.canon,
        }
    }

    /// Returns the [`Date`] this [`Contract`] ends on.
    ///
    /// [`Date`]: common::Date
    #[must_use]
    pub fn ends_on(&self) -> EndDate {
        match self {
            Self::Mandate(c) => c.ends_on,
            Self::Lease(c) => c.ends_on,
        }
    }

    /// Returns whether this [`Contract`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Mandate(c) => c.is_active(),
            Self::Lease(c) => c.is_active(),
        }
    }
}

/// ID of a [`Contract`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Contract`]."]
    enum Kind {
        #[doc = "[`Mandate`] [`Contract`]."]
        Mandate = 1,

        #[doc = "[`Lease`] [`Contract`]."]
        Lease = 2,
    }
}

/// Reason a [`Contract`] was cancelled for.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Creates a new [`CancellationReason`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reason` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Creates a new [`CancellationReason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`CancellationReason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 512
    }
}

impl FromStr for CancellationReason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CancellationReason`")
    }
}

/// Agreed term of a [`Contract`] in calendar months.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct DurationMonths(u32);

impl DurationMonths {
    /// Creates a new [`DurationMonths`] by checking the provided value is
    /// within `1..=600`.
    #[must_use]
    pub fn new(months: u32) -> Option<Self> {
        (1..=600).contains(&months).then_some(Self(months))
    }

    /// Returns the number of months of this [`DurationMonths`].
    #[must_use]
    pub fn months(self) -> u32 {
        self.0
    }
}

/// Day of month a [`Lease`] payment is due on.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct PaymentDay(u8);

impl PaymentDay {
    /// Creates a new [`PaymentDay`] by checking the provided value is
    /// within `1..=31`.
    #[must_use]
    pub fn new(day: u8) -> Option<Self> {
        (1..=31).contains(&day).then_some(Self(day))
    }

    /// Returns the day of month of this [`PaymentDay`].
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Marker type indicating [`Contract`] commencement.
#[derive(Clone, Copy, Debug)]
pub struct Commencement;

/// Marker type indicating [`Contract`] expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`Date`] a [`Contract`] starts on.
///
/// [`Date`]: common::Date
pub type StartDate = DateOf<(Contract, Commencement)>;

/// [`Date`] a [`Contract`] ends on.
///
/// [`Date`]: common::Date
pub type EndDate = DateOf<(Contract, Expiration)>;

/// [`DateTime`] when a [`Contract`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was last modified.
///
/// [`DateTime`]: common::DateTime
pub type ModificationDateTime = DateTimeOf<(Contract, unit::Modification)>;
