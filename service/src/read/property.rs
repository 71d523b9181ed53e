//! [`Property`]-related read definitions.

#[cfg(doc)]
use crate::domain::{contract::Lease, contract::Mandate, Property};

/// Selector of [`Property`]s having no active [`Mandate`] [`Contract`].
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Copy, Debug)]
pub struct WithoutActiveMandate;

/// Selector of [`Property`]s available for a new [`Lease`] [`Contract`]:
/// covered by an active [`Mandate`] and not leased out already.
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Copy, Debug)]
pub struct EligibleForLease;
