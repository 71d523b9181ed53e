//! Domain definitions.

pub mod alert;
pub mod contract;
pub mod ipc;
pub mod person;
pub mod property;
pub mod renewal;

pub use self::{alert::Alert, contract::Contract, property::Property};
