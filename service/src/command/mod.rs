//! [`Command`] definition.

pub mod apply_ipc_increment;
pub mod create_lease_contract;
pub mod create_mandate_contract;
pub mod record_ipc_value;
pub mod renew_lease_contract;
pub mod renew_mandate_contract;
pub mod terminate_lease_contract;
pub mod terminate_mandate_contract;
pub mod update_lease_contract;
pub mod update_mandate_contract;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    apply_ipc_increment::ApplyIpcIncrement,
    create_lease_contract::CreateLeaseContract,
    create_mandate_contract::CreateMandateContract,
    record_ipc_value::RecordIpcValue,
    renew_lease_contract::RenewLeaseContract,
    renew_mandate_contract::RenewMandateContract,
    terminate_lease_contract::TerminateLeaseContract,
    terminate_mandate_contract::TerminateMandateContract,
    update_lease_contract::UpdateLeaseContract,
    update_mandate_contract::UpdateMandateContract,
};
