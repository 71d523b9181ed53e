//! [`Command`] for renewing a [`Mandate`] [`Contract`] for another term.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    Date, DateTime, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, person, renewal, Contract},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Mandate;

use super::Command;

/// [`Command`] for renewing a [`Mandate`] [`Contract`] for another term.
///
/// The end date is pushed forward by the agreed term. The canon is never
/// re-indexed on a [`Mandate`] renewal.
#[derive(Clone, Debug)]
pub struct RenewMandateContract {
    /// ID of the [`Contract`] to be renewed.
    pub mandate_id: contract::Id,

    /// [`Actor`] renewing the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<RenewMandateContract> for Service<Db>
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
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Insert<renewal::Event>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RenewMandateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenewMandateContract { mandate_id, actor } = cmd;

        self.database()
            .execute(Select(By::<Option<Contract>, _>::new(mandate_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MandateNotExists(mandate_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Contract`.
        tx.execute(Lock(By::new(mandate_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Some(Contract::Mandate(mut mandate)) = tx
            .execute(Select(By::<Option<Contract>, _>::new(mandate_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Err(tracerr::new!(E::MandateNotExists(mandate_id)));
        };
        if !mandate.is_active() {
            return Err(tracerr::new!(E::MandateNotRenewable(mandate_id)));
        }

        let today = Date::today();
        let original_end = mandate.ends_on;
        let renewed_end =
            original_end.shift_months(mandate.duration.months());

        #[expect(unsafe_code, reason = "the reason is a non-empty literal")]
        let event = renewal::Event {
            id: renewal::Id::new(),
            contract_kind: contract::Kind::Mandate,
            contract_id: mandate.id,
            original_start: mandate.starts_on,
            original_end,
            renewed_end,
            canon_before: mandate.canon,
            canon_after: mandate.canon,
            percent: Percent::ZERO,
            reason: unsafe {
                renewal::Reason::new_unchecked("renewed without indexation")
            },
            renewed_on: today,
            created_at: DateTime::now().coerce(),
            created_by: actor.clone(),
        };

        mandate.ends_on = renewed_end;
        mandate.renewed_on = Some(today);
        mandate.updated_at = DateTime::now().coerce();
        mandate.updated_by = actor;

        let contract = Contract::from(mandate);
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

/// Error of [`RenewMandateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Mandate`] [`Contract`] with the provided ID does not exist.
    #[display("`Mandate(id: {_0})` does not exist")]
    MandateNotExists(#[error(not(source))] contract::Id),

    /// [`Mandate`] [`Contract`] is not active, so cannot be renewed.
    #[display("`Mandate(id: {_0})` is not active, so cannot be renewed")]
    MandateNotRenewable(#[error(not(source))] contract::Id),
}

#[cfg(test)]
mod spec {
    use common::Percent;
    use futures::executor::block_on;

    use crate::{
        domain::contract::{self, mandate},
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, ExecutionError, RenewMandateContract};

    #[test]
    fn pushes_end_date_and_never_indexes_canon() {
        let db = InMemory::new();
        let property = fixture::property();
        let mandate = fixture::mandate(property.id);
        let mandate_id = mandate.id;
        db.seed_property(property);
        db.seed_contract(mandate);
        db.seed_ipc_record(fixture::ipc_record(2025, "9"));

        let svc = fixture::service(db.clone());
        let renewed = block_on(svc.execute(RenewMandateContract {
            mandate_id,
            actor: fixture::actor(),
        }))
        .unwrap();

        assert_eq!(renewed.ends_on(), fixture::date(2026, 1, 15).coerce());
        assert_eq!(renewed.canon(), fixture::money(1_000_000));

        let events = db.renewal_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].contract_id, mandate_id);
        assert_eq!(events[0].percent, Percent::ZERO);
        assert_eq!(events[0].canon_before, events[0].canon_after);
    }

    #[test]
    fn rejects_inactive_mandate() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut mandate = fixture::mandate(property.id);
        mandate.status = mandate::Status::Finished;
        let mandate_id = mandate.id;
        db.seed_property(property);
        db.seed_contract(mandate);

        let svc = fixture::service(db);
        let err = block_on(svc.execute(RenewMandateContract {
            mandate_id,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MandateNotRenewable(id) if *id == mandate_id,
        ));
    }

    #[test]
    fn rejects_unknown_mandate() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let mandate_id = contract::Id::new();
        let err = block_on(svc.execute(RenewMandateContract {
            mandate_id,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MandateNotExists(id) if *id == mandate_id,
        ));
    }
}
