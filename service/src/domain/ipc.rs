//! IPC (consumer price index) definitions.

use common::{unit, Date, DateTimeOf, Money, Percent};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract, person};
#[cfg(doc)]
use crate::domain::{contract::Lease, Contract};

/// Published IPC value for one year.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Year this [`Record`] is for.
    pub year: Year,

    /// Published index value.
    pub value: Percent,

    /// [`Date`] this [`Record`] was published on.
    pub published_on: Date,

    /// Indicator whether this [`Record`] may be used for indexation.
    pub is_active: bool,
}

/// Year an IPC [`Record`] is for.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Year(i32);

/// Selector of the latest active IPC [`Record`].
#[derive(Clone, Copy, Debug)]
pub struct Latest;

/// Applied indexation of a [`Lease`] canon, kept for audit.
#[derive(Clone, Debug)]
pub struct Increment {
    /// ID of this [`Increment`].
    pub id: Id,

    /// ID of the indexed [`Lease`] [`Contract`].
    pub lease_id: contract::Id,

    /// [`Date`] the indexation took effect on.
    pub applied_on: Date,

    /// Applied [`Percent`].
    pub value: Percent,

    /// [`Lease`] canon before the indexation.
    pub canon_before: Money,

    /// [`Lease`] canon after the indexation.
    pub canon_after: Money,

    /// Free-form notes attached to this [`Increment`], if any.
    pub notes: Option<String>,

    /// [`DateTime`] when this [`Increment`] was recorded.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`Actor`] who applied this [`Increment`].
    ///
    /// [`Actor`]: person::Actor
    pub created_by: person::Actor,
}

/// ID of an [`Increment`].
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

/// [`DateTime`] when an [`Increment`] was recorded.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Increment, unit::Creation)>;
