//! [`Command`] for updating an existing [`Lease`] [`Contract`].

use common::{
    operations::{
        By, Commit, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, person, Contract},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Lease;

use super::Command;

/// [`Command`] for updating an existing [`Lease`] [`Contract`].
///
/// Only the provided fields are changed, the rest are kept as is.
#[derive(Clone, Debug)]
pub struct UpdateLeaseContract {
    /// ID of the [`Contract`] to be updated.
    pub lease_id: contract::Id,

    /// New end [`Date`] of the [`Contract`].
    ///
    /// [`Date`]: common::Date
    pub ends_on: Option<contract::EndDate>,

    /// New monthly canon of the [`Contract`].
    pub canon: Option<Money>,

    /// New day of month the rent payment is due on.
    pub payment_day: Option<contract::PaymentDay>,

    /// [`Actor`] updating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<UpdateLeaseContract> for Service<Db>
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
        cmd: UpdateLeaseContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateLeaseContract {
            lease_id,
            ends_on,
            canon,
            payment_day,
            actor,
        } = cmd;

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

        if let Some(date) = ends_on {
            lease.ends_on = date;
        }
        if let Some(amount) = canon {
            lease.canon = amount;
        }
        if let Some(day) = payment_day {
            lease.payment_day = day;
        }
        lease.updated_at = DateTime::now().coerce();
        lease.updated_by = actor;

        let contract = Contract::from(lease);
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

/// Error of [`UpdateLeaseContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lease`] [`Contract`] with the provided ID does not exist.
    #[display("`Lease(id: {_0})` does not exist")]
    LeaseNotExists(#[error(not(source))] contract::Id),
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;

    use crate::{
        domain::{contract, Contract},
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, ExecutionError, UpdateLeaseContract};

    #[test]
    fn merges_only_the_provided_fields() {
        let db = InMemory::new();
        let property = fixture::property();
        let lease = fixture::lease(property.id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);

        let svc = fixture::service(db.clone());
        block_on(svc.execute(UpdateLeaseContract {
            lease_id,
            ends_on: Some(fixture::date(2025, 6, 10).coerce()),
            canon: Some(fixture::money(1_100_000)),
            payment_day: None,
            actor: fixture::actor(),
        }))
        .unwrap();

        let Some(Contract::Lease(lease)) = db.contract(lease_id) else {
            panic!("expected a `Lease`");
        };
        assert_eq!(lease.ends_on, fixture::date(2025, 6, 10).coerce());
        assert_eq!(lease.canon, fixture::money(1_100_000));
        assert_eq!(lease.payment_day, contract::PaymentDay::new(5).unwrap());
        assert_eq!(lease.updated_by, fixture::actor());
    }

    #[test]
    fn rejects_unknown_lease() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let lease_id = contract::Id::new();
        let err = block_on(svc.execute(UpdateLeaseContract {
            lease_id,
            ends_on: None,
            canon: None,
            payment_day: None,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::LeaseNotExists(id) if *id == lease_id,
        ));
    }
}
