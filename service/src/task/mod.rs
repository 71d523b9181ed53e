//! Background [`Task`]s definitions.

mod background;
pub mod expiry_alerts;

pub use common::Handler as Task;

pub use self::{background::Background, expiry_alerts::ExpiryAlerts};
