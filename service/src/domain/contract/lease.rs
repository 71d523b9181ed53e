//! [`Lease`] [`Contract`] definition.

use common::{define_kind, Date, Money};

use crate::domain::{person, property};

use super::{
    CancellationReason, CreationDateTime, DurationMonths, EndDate, Id,
    ModificationDateTime, PaymentDay, StartDate,
};
#[cfg(doc)]
use crate::domain::{Contract, Property};

/// A [`Contract`] leasing a [`Property`] out to a tenant.
#[derive(Clone, Debug)]
pub struct Lease {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the [`Property`] this [`Contract`] is over.
    pub property_id: property::Id,

    /// ID of the person renting the [`Property`].
    pub tenant_id: person::Id,

    /// ID of the person co-signing this [`Contract`], if any.
    pub cosigner_id: Option<person::Id>,

    /// [`Date`] this [`Contract`] starts on.
    pub starts_on: StartDate,

    /// [`Date`] this [`Contract`] ends on.
    pub ends_on: EndDate,

    /// Agreed term of this [`Contract`].
    pub duration: DurationMonths,

    /// Monthly canon agreed in this [`Contract`].
    pub canon: Money,

    /// Deposit paid at the beginning of this [`Contract`].
    pub deposit: Money,

    /// Day of month the rent payment is due on.
    pub payment_day: PaymentDay,

    /// [`Status`] of this [`Contract`].
    pub status: Status,

    /// Reason this [`Contract`] was cancelled for, if it was.
    pub cancellation_reason: Option<CancellationReason>,

    /// Indicator whether expiry alerts should be raised for this
    /// [`Contract`].
    pub expiry_alert: bool,

    /// Indicator whether indexation anniversary alerts should be raised for
    /// this [`Contract`].
    pub ipc_alert: bool,

    /// [`Date`] this [`Contract`] was last renewed on, if it was.
    pub renewed_on: Option<Date>,

    /// [`Date`] the canon of this [`Contract`] was last indexed on, if it
    /// was.
    pub last_increment_on: Option<Date>,

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

impl Lease {
    /// Returns whether this [`Contract`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

define_kind! {
    #[doc = "Status of a [`Lease`] [`Contract`]."]
    enum Status {
        #[doc = "The [`Contract`] is in force."]
        Active = 1,

        #[doc = "The [`Contract`] ran to its agreed end."]
        Finished = 2,

        #[doc = "The [`Contract`] is in legal proceedings."]
        Legal = 3,

        #[doc = "The [`Contract`] was cancelled before its agreed end."]
        Cancelled = 4,
    }
}
