//! [`Query`] collection related to [`Property`]s.

use common::operations::By;

use crate::{
    domain::{property, Property},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Property`] by its [`property::Id`].
pub type ById = DatabaseQuery<By<Option<Property>, property::Id>>;

/// Queries [`Property`]s having no active [`Mandate`] [`Contract`].
///
/// [`Contract`]: crate::domain::Contract
/// [`Mandate`]: crate::domain::contract::Mandate
pub type WithoutActiveMandate =
    DatabaseQuery<By<Vec<Property>, read::property::WithoutActiveMandate>>;

/// Queries [`Property`]s available for a new [`Lease`] [`Contract`].
///
/// [`Contract`]: crate::domain::Contract
/// [`Lease`]: crate::domain::contract::Lease
pub type EligibleForLease =
    DatabaseQuery<By<Vec<Property>, read::property::EligibleForLease>>;
