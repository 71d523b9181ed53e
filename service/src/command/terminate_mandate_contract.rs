//! [`Command`] for terminating a [`Mandate`] [`Contract`] before its agreed
//! end.

use common::{
    operations::{
        By, Commit, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, mandate},
        person, Contract,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::{contract::Mandate, Property};

use super::Command;

/// [`Command`] for terminating a [`Mandate`] [`Contract`] before its agreed
/// end.
///
/// The managed [`Property`] is left untouched: an active [`Lease`] over it
/// keeps running even with no [`Mandate`] in force.
///
/// [`Lease`]: contract::Lease
#[derive(Clone, Debug)]
pub struct TerminateMandateContract {
    /// ID of the [`Contract`] to be terminated.
    pub mandate_id: contract::Id,

    /// Reason the [`Contract`] is terminated for.
    pub reason: contract::CancellationReason,

    /// [`Actor`] terminating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<TerminateMandateContract> for Service<Db>
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
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TerminateMandateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TerminateMandateContract {
            mandate_id,
            reason,
            actor,
        } = cmd;

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
            return Err(tracerr::new!(E::MandateNotActive(mandate_id)));
        }

        mandate.status = mandate::Status::Cancelled;
        mandate.cancellation_reason = Some(reason);
        mandate.ends_on = contract::EndDate::today();
        mandate.updated_at = DateTime::now().coerce();
        mandate.updated_by = actor;

        let contract = Contract::from(mandate);
        tx.execute(Update(contract.clone()))
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

/// Error of [`TerminateMandateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Mandate`] [`Contract`] is not active.
    #[display("`Mandate(id: {_0})` is not active")]
    MandateNotActive(#[error(not(source))] contract::Id),

    /// [`Mandate`] [`Contract`] with the provided ID does not exist.
    #[display("`Mandate(id: {_0})` does not exist")]
    MandateNotExists(#[error(not(source))] contract::Id),
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;

    use crate::{
        domain::{
            contract::{self, mandate},
            property, Contract,
        },
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, ExecutionError, TerminateMandateContract};

    fn reason() -> contract::CancellationReason {
        "owner sold the property".parse().unwrap()
    }

    #[test]
    fn cancels_mandate_and_leaves_property_untouched() {
        let db = InMemory::new();
        let mut property = fixture::property();
        property.availability = property::Availability::Occupied;
        let property_id = property.id;
        let mandate = fixture::mandate(property_id);
        let mandate_id = mandate.id;
        db.seed_property(property);
        db.seed_contract(mandate);

        let svc = fixture::service(db.clone());
        let terminated = block_on(svc.execute(TerminateMandateContract {
            mandate_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap();

        let Contract::Mandate(terminated) = terminated else {
            panic!("expected a `Mandate`");
        };
        assert_eq!(terminated.status, mandate::Status::Cancelled);
        assert_eq!(terminated.cancellation_reason, Some(reason()));

        // An active `Lease` keeps running even with no `Mandate` in force.
        assert_eq!(
            db.property(property_id).unwrap().availability,
            property::Availability::Occupied,
        );
    }

    #[test]
    fn rejects_already_terminated_mandate() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut mandate = fixture::mandate(property.id);
        mandate.status = mandate::Status::Cancelled;
        let mandate_id = mandate.id;
        db.seed_property(property);
        db.seed_contract(mandate);

        let svc = fixture::service(db);
        let err = block_on(svc.execute(TerminateMandateContract {
            mandate_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MandateNotActive(id) if *id == mandate_id,
        ));
    }

    #[test]
    fn rejects_unknown_mandate() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let mandate_id = contract::Id::new();
        let err = block_on(svc.execute(TerminateMandateContract {
            mandate_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MandateNotExists(id) if *id == mandate_id,
        ));
    }
}
