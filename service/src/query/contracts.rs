//! [`Query`] collection related to the multiple [`Contract`]s.

use common::operations::By;

use crate::{
    domain::{contract::Lease, person},
    read,
};
#[cfg(doc)]
use crate::{domain::Contract, Query};

use super::DatabaseQuery;

/// Queries a list of [`Contract`]s.
pub type List = DatabaseQuery<
    By<read::contract::list::Page, read::contract::list::Selector>,
>;

/// Queries total count of [`Contract`]s.
pub type TotalCount = DatabaseQuery<By<read::contract::list::TotalCount, ()>>;

/// Queries active [`Lease`]s ending within the provided window, along with
/// their projected canons.
pub type ExpiringLeases = DatabaseQuery<
    By<Vec<read::contract::Expiring>, read::contract::ExpiringWithin>,
>;

/// Queries active [`Lease`]s over [`Property`]s whose active [`Mandate`] is
/// handled by the provided advisor.
///
/// [`Mandate`]: crate::domain::contract::Mandate
/// [`Property`]: crate::domain::Property
pub type LeasesByAdvisor = DatabaseQuery<By<Vec<Lease>, person::Id>>;
