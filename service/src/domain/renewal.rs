//! Contract renewal ledger definitions.

use common::{unit, Date, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract, person};
#[cfg(doc)]
use crate::domain::Contract;

/// Renewal of a [`Contract`], recorded append-only.
///
/// [`Event`]s are never updated or deleted; they form the renewal history
/// of a [`Contract`].
#[derive(Clone, Debug)]
pub struct Event {
    /// ID of this [`Event`].
    pub id: Id,

    /// Kind of the renewed [`Contract`].
    pub contract_kind: contract::Kind,

    /// ID of the renewed [`Contract`].
    pub contract_id: contract::Id,

    /// [`Date`] the [`Contract`] originally started on.
    pub original_start: contract::StartDate,

    /// [`Date`] the [`Contract`] ended on before this renewal.
    pub original_end: contract::EndDate,

    /// [`Date`] the [`Contract`] ends on after this renewal.
    pub renewed_end: contract::EndDate,

    /// Canon of the [`Contract`] before this renewal.
    pub canon_before: Money,

    /// Canon of the [`Contract`] after this renewal.
    pub canon_after: Money,

    /// Indexation [`Percent`] applied by this renewal (zero if none).
    pub percent: Percent,

    /// Human-readable [`Reason`] of this renewal.
    pub reason: Reason,

    /// [`Date`] this renewal took effect on.
    pub renewed_on: Date,

    /// [`DateTime`] when this [`Event`] was recorded.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`Actor`] who performed this renewal.
    ///
    /// [`Actor`]: person::Actor
    pub created_by: person::Actor,
}

/// ID of an [`Event`].
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

/// Reason of a renewal [`Event`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reason` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Creates a new [`Reason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`Reason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 512
    }
}

impl FromStr for Reason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Reason`")
    }
}

/// [`DateTime`] when an [`Event`] was recorded.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Event, unit::Creation)>;
