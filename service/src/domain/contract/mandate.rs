//! [`Mandate`] [`Contract`] definition.

use common::{define_kind, Date, Money};
use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::{person, property};

use super::{
    CancellationReason, CreationDateTime, DurationMonths, EndDate, Id,
    ModificationDateTime, StartDate,
};
#[cfg(doc)]
use crate::domain::{Contract, Property};

/// A [`Contract`] authorizing the agency to manage a [`Property`] on the
/// owner's behalf.
#[derive(Clone, Debug)]
pub struct Mandate {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the [`Property`] this [`Contract`] is over.
    pub property_id: property::Id,

    /// ID of the person owning the [`Property`].
    pub owner_id: person::Id,

    /// ID of the advisor handling this [`Contract`].
    pub advisor_id: person::Id,

    /// [`Date`] this [`Contract`] starts on.
    pub starts_on: StartDate,

    /// [`Date`] this [`Contract`] ends on.
    pub ends_on: EndDate,

    /// Agreed term of this [`Contract`].
    pub duration: DurationMonths,

    /// Monthly canon agreed in this [`Contract`].
    pub canon: Money,

    /// Agency commission rate of this [`Contract`].
    pub commission: FeeRate,

    /// VAT rate applied to the commission.
    pub vat: FeeRate,

    /// [`Status`] of this [`Contract`].
    pub status: Status,

    /// Reason this [`Contract`] was cancelled for, if it was.
    pub cancellation_reason: Option<CancellationReason>,

    /// Indicator whether expiry alerts should be raised for this
    /// [`Contract`].
    pub expiry_alert: bool,

    /// [`Date`] this [`Contract`] was last renewed on, if it was.
    pub renewed_on: Option<Date>,

    /// [`DateTime`] when this [`Contract`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`Actor`] who created this [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub created_by: person::Actor,

    /// [`DateTime`] when this [`Contract`] was last modified.
    ///
    /// [`DateTime`]: common::DateTime
    pub updated_at: ModificationDateTime,

    /// [`Actor`] who last modified this [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub updated_by: person::Actor,
}

impl Mandate {
    /// Returns whether this [`Contract`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

define_kind! {
    #[doc = "Status of a [`Mandate`] [`Contract`]."]
    enum Status {
        #[doc = "The [`Contract`] is in force."]
        Active = 1,

        #[doc = "The [`Contract`] ran to its agreed end."]
        Finished = 2,

        #[doc = "The [`Contract`] was cancelled before its agreed end."]
        Cancelled = 3,
    }
}

/// Fee rate expressed in basis points over a base of `10_000`
/// (`800` is `8.00%`).
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FeeRate(i32);

impl FeeRate {
    /// Base the [`FeeRate`] basis points are taken over.
    pub const BASE: i32 = 10_000;

    /// Default VAT rate (`19.00%`).
    pub const DEFAULT_VAT: Self = Self(1900);

    /// Creates a new [`FeeRate`] by checking the provided value is within
    /// `0..=`[`BASE`].
    ///
    /// [`BASE`]: Self::BASE
    #[must_use]
    pub fn new(basis_points: i32) -> Option<Self> {
        (0..=Self::BASE)
            .contains(&basis_points)
            .then_some(Self(basis_points))
    }

    /// Returns the basis points of this [`FeeRate`].
    #[must_use]
    pub fn basis_points(self) -> i32 {
        self.0
    }
}
