//! [`Command`] for terminating a [`Lease`] [`Contract`] before its agreed
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
        contract::{self, lease},
        person, property, Contract, Property,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Lease;

use super::Command;

/// [`Command`] for terminating a [`Lease`] [`Contract`] before its agreed
/// end.
///
/// The leased [`Property`] becomes available again, atomically with the
/// termination itself.
#[derive(Clone, Debug)]
pub struct TerminateLeaseContract {
    /// ID of the [`Contract`] to be terminated.
    pub lease_id: contract::Id,

    /// Reason the [`Contract`] is terminated for.
    pub reason: contract::CancellationReason,

    /// [`Actor`] terminating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<TerminateLeaseContract> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TerminateLeaseContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TerminateLeaseContract {
            lease_id,
            reason,
            actor,
        } = cmd;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(lease_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LeaseNotExists(lease_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(contract.property_id())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

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
            return Err(tracerr::new!(E::LeaseNotActive(lease_id)));
        }

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(lease.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(lease.property_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        lease.status = lease::Status::Cancelled;
        lease.cancellation_reason = Some(reason);
        lease.ends_on = contract::EndDate::today();
        lease.updated_at = now.coerce();
        lease.updated_by = actor;

        let contract = Contract::from(lease);
        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        property.availability = property::Availability::Available;
        property.updated_at = now.coerce();
        tx.execute(Update(property))
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

/// Error of [`TerminateLeaseContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lease`] [`Contract`] is not active.
    #[display("`Lease(id: {_0})` is not active")]
    LeaseNotActive(#[error(not(source))] contract::Id),

    /// [`Lease`] [`Contract`] with the provided ID does not exist.
    #[display("`Lease(id: {_0})` does not exist")]
    LeaseNotExists(#[error(not(source))] contract::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;

    use crate::{
        domain::{
            contract::{self, lease},
            property, Contract,
        },
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, ExecutionError, TerminateLeaseContract};

    fn reason() -> contract::CancellationReason {
        "tenant moved out early".parse().unwrap()
    }

    #[test]
    fn cancels_lease_and_frees_property() {
        let db = InMemory::new();
        let mut property = fixture::property();
        property.availability = property::Availability::Occupied;
        let property_id = property.id;
        let lease = fixture::lease(property_id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);

        let svc = fixture::service(db.clone());
        let terminated = block_on(svc.execute(TerminateLeaseContract {
            lease_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap();

        let Contract::Lease(terminated) = terminated else {
            panic!("expected a `Lease`");
        };
        assert_eq!(terminated.status, lease::Status::Cancelled);
        assert_eq!(terminated.cancellation_reason, Some(reason()));

        assert_eq!(
            db.property(property_id).unwrap().availability,
            property::Availability::Available,
        );
    }

    #[test]
    fn rejects_already_terminated_lease() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut lease = fixture::lease(property.id);
        lease.status = lease::Status::Cancelled;
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);

        let svc = fixture::service(db);
        let err = block_on(svc.execute(TerminateLeaseContract {
            lease_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::LeaseNotActive(id) if *id == lease_id,
        ));
    }

    #[test]
    fn rejects_unknown_lease() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let lease_id = contract::Id::new();
        let err = block_on(svc.execute(TerminateLeaseContract {
            lease_id,
            reason: reason(),
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::LeaseNotExists(id) if *id == lease_id,
        ));
    }
}
