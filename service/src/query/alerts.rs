//! [`Query`] collection related to [`Alert`]s.

use common::operations::By;

use crate::domain::{alert, Alert};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries [`Alert`]s having the provided [`alert::Status`], newest first.
pub type ByStatus = DatabaseQuery<By<Vec<Alert>, alert::Status>>;
