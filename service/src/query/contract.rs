//! [`Query`] collection related to a single [`Contract`].

use common::operations::By;

use crate::{
    domain::{
        contract::{self, Lease, Mandate},
        property, renewal, Contract,
    },
    read::contract::Active,
};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`Contract`] by its [`contract::Id`].
pub type ById = DatabaseQuery<By<Option<Contract>, contract::Id>>;

/// Queries an active [`Mandate`] by ID of the related [`Property`].
pub type ActiveMandate =
    DatabaseQuery<By<Option<Active<Mandate>>, property::Id>>;

/// Queries an active [`Lease`] by ID of the related [`Property`].
pub type ActiveLease = DatabaseQuery<By<Option<Active<Lease>>, property::Id>>;

/// Queries the renewal history of a [`Contract`], newest first.
pub type Renewals = DatabaseQuery<By<Vec<renewal::Event>, contract::Id>>;
