//! [`Command`] for renewing a [`Lease`] [`Contract`] for another term.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    Date, DateTime, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, ipc, person, renewal, Contract},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Lease;

use super::Command;

/// [`Command`] for renewing a [`Lease`] [`Contract`] for another term.
///
/// The end date is pushed forward by the agreed term, with the day clamped
/// down to the last valid day of the target month. Terms of a year or
/// longer also index the canon by the latest published index value.
#[derive(Clone, Debug)]
pub struct RenewLeaseContract {
    /// ID of the [`Contract`] to be renewed.
    pub lease_id: contract::Id,

    /// [`Actor`] renewing the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<RenewLeaseContract> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<ipc::Record>, ipc::Latest>>,
            Ok = Option<ipc::Record>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Insert<renewal::Event>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RenewLeaseContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenewLeaseContract { lease_id, actor } = cmd;

        self.database()
            .execute(Select(By::<Option<Contract>, _>::new(lease_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LeaseNotExists(lease_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Contract`.
        tx.execute(Lock(By::new(lease_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Some(Contract::Lease(mut lease)) = tx
            .execute(Select(By::<Option<Contract>, _>::new(lease_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Err(tracerr::new!(E::LeaseNotExists(lease_id)));
        };
        if !lease.is_active() {
            return Err(tracerr::new!(E::LeaseNotRenewable(lease_id)));
        }

        let original_end = lease.ends_on;
        let renewed_end = original_end.shift_months(lease.duration.months());

        // Indexation applies to terms of a year or longer only.
        let (percent, reason) = if lease.duration.months() >= 12 {
            let record = tx
                .execute(Select(By::<Option<ipc::Record>, _>::new(
                    ipc::Latest,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            match record {
                Some(record) => (
                    record.value,
                    format!("indexed by {} value of {}%", record.year,
                            record.value),
                ),
                None => {
                    log::warn!(
                        lease_id = %lease_id,
                        "no active index value published, \
                         renewing with unchanged canon",
                    );
                    (Percent::ZERO, "no active index value published".into())
                }
            }
        } else {
            (
                Percent::ZERO,
                "no indexation, contract shorter than one year".into(),
            )
        };

        let canon_before = lease.canon;
        let canon_after = canon_before + canon_before.percent_of(percent);

        let today = Date::today();
        #[expect(unsafe_code, reason = "the reason is non-empty")]
        let event = renewal::Event {
            id: renewal::Id::new(),
            contract_kind: contract::Kind::Lease,
            contract_id: lease.id,
            original_start: lease.starts_on,
            original_end,
            renewed_end,
            canon_before,
            canon_after,
            percent,
            reason: unsafe { renewal::Reason::new_unchecked(reason) },
            renewed_on: today,
            created_at: DateTime::now().coerce(),
            created_by: actor.clone(),
        };

        lease.ends_on = renewed_end;
        lease.canon = canon_after;
        lease.renewed_on = Some(today);
        lease.updated_at = DateTime::now().coerce();
        lease.updated_by = actor;

        let contract = Contract::from(lease);
        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(event))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`RenewLeaseContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lease`] [`Contract`] with the provided ID does not exist.
    #[display("`Lease(id: {_0})` does not exist")]
    LeaseNotExists(#[error(not(source))] contract::Id),

    /// [`Lease`] [`Contract`] is not active, so cannot be renewed.
    #[display("`Lease(id: {_0})` is not active, so cannot be renewed")]
    LeaseNotRenewable(#[error(not(source))] contract::Id),
}
