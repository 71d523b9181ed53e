//! [`Query`] collection related to index values.

use common::operations::By;

use crate::domain::ipc;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the latest active index [`ipc::Record`].
pub type Latest = DatabaseQuery<By<Option<ipc::Record>, ipc::Latest>>;

/// Queries an index [`ipc::Record`] by its [`ipc::Year`].
pub type ByYear = DatabaseQuery<By<Option<ipc::Record>, ipc::Year>>;
