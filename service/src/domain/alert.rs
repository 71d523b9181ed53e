//! [`Alert`] definitions.

use common::{define_kind, unit, Date, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract, person};
#[cfg(doc)]
use crate::domain::{contract::Lease, contract::Mandate, Contract};

/// Actionable notification about an upcoming [`Contract`] event.
#[derive(Clone, Debug)]
pub struct Alert {
    /// ID of this [`Alert`].
    pub id: Id,

    /// [`Kind`] of this [`Alert`].
    pub kind: Kind,

    /// Human-readable [`Description`] of this [`Alert`].
    pub description: Description,

    /// Kind of the [`Contract`] this [`Alert`] refers to.
    pub contract_kind: contract::Kind,

    /// ID of the [`Contract`] this [`Alert`] refers to.
    pub contract_id: contract::Id,

    /// [`Status`] of this [`Alert`].
    pub status: Status,

    /// [`DateTime`] when this [`Alert`] was raised.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`Actor`] who raised this [`Alert`].
    ///
    /// [`Actor`]: person::Actor
    pub created_by: person::Actor,
}

/// ID of an [`Alert`].
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
    #[doc = "Kind of an [`Alert`]."]
    enum Kind {
        #[doc = "[`Mandate`] [`Contract`] approaches its end date."]
        MandateExpiry = 1,

        #[doc = "[`Lease`] [`Contract`] approaches its end date."]
        LeaseExpiry = 2,

        #[doc = "[`Lease`] [`Contract`] approaches its indexation \
                 anniversary."]
        IpcAnniversary = 3,
    }
}

define_kind! {
    #[doc = "Status of an [`Alert`]."]
    enum Status {
        #[doc = "The [`Alert`] awaits being acted upon."]
        Pending = 1,

        #[doc = "The [`Alert`] has been acted upon."]
        Actioned = 2,
    }
}

/// Human-readable description of an [`Alert`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
#[from(String, &str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// Parameters to look up an existing [`Alert`] by, for deduplication of
/// repeated sweeps within one day.
#[derive(Clone, Copy, Debug)]
pub struct Lookup {
    /// [`Kind`] of the looked up [`Alert`].
    pub kind: Kind,

    /// Kind of the [`Contract`] the looked up [`Alert`] refers to.
    pub contract_kind: contract::Kind,

    /// ID of the [`Contract`] the looked up [`Alert`] refers to.
    pub contract_id: contract::Id,

    /// [`Date`] the looked up [`Alert`] was raised on.
    pub created_on: Date,
}

/// [`DateTime`] when an [`Alert`] was raised.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Alert, unit::Creation)>;
