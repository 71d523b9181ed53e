//! [`Command`] for creating a new [`Lease`] [`Contract`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, lease, Lease, Mandate},
        person, property, Contract, Property,
    },
    infra::{database, Database},
    read::contract::Active,
    Service,
};

use super::Command;

/// Partial unique index backstopping the single active [`Lease`] per
/// [`Property`] rule at the schema level.
const ONE_ACTIVE_LEASE_IDX: &str = "contracts_one_active_lease_per_property";

/// [`Command`] for creating a new [`Lease`] [`Contract`].
#[derive(Clone, Debug)]
pub struct CreateLeaseContract {
    /// ID of the [`Property`] to lease out.
    pub property_id: property::Id,

    /// ID of the person renting the [`Property`].
    pub tenant_id: person::Id,

    /// ID of the person co-signing the new [`Contract`], if any.
    pub cosigner_id: Option<person::Id>,

    /// [`Date`] the new [`Contract`] starts on.
    ///
    /// [`Date`]: common::Date
    pub starts_on: contract::StartDate,

    /// Agreed term of the new [`Contract`].
    pub duration: contract::DurationMonths,

    /// Monthly canon agreed in the new [`Contract`].
    pub canon: Money,

    /// Deposit paid at the beginning of the new [`Contract`].
    pub deposit: Money,

    /// Day of month the rent payment is due on.
    pub payment_day: contract::PaymentDay,

    /// [`Actor`] creating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<CreateLeaseContract> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Mandate>>, property::Id>>,
            Ok = Option<Active<Mandate>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Lease>>, property::Id>>,
            Ok = Option<Active<Lease>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateLeaseContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLeaseContract {
            property_id,
            tenant_id,
            cosigner_id,
            starts_on,
            duration,
            canon,
            deposit,
            payment_day,
            actor,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Select(By::<Option<Active<Mandate>>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoActiveMandate(property_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        if tx
            .execute(Select(By::<Option<Active<Lease>>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::ActiveLeaseAlreadyExists(
                property_id
            )));
        }

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let contract = Contract::from(Lease {
            id: contract::Id::new(),
            property_id,
            tenant_id,
            cosigner_id,
            starts_on,
            ends_on: starts_on.coerce().shift_months(duration.months()),
            duration,
            canon,
            deposit,
            payment_day,
            status: lease::Status::Active,
            cancellation_reason: None,
            expiry_alert: true,
            ipc_alert: true,
            renewed_on: None,
            last_increment_on: None,
            created_at: now.coerce(),
            created_by: actor.clone(),
            updated_at: now.coerce(),
            updated_by: actor,
        });
        tx.execute(Insert(contract.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(Some(ONE_ACTIVE_LEASE_IDX)) {
                    tracerr::new!(E::ActiveLeaseAlreadyExists(property_id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        property.availability = property::Availability::Occupied;
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

/// Error of [`CreateLeaseContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Property`] is already leased out.
    #[display("`Property(id: {_0})` already has an active `Lease`")]
    ActiveLeaseAlreadyExists(#[error(not(source))] property::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] has no active [`Mandate`] [`Contract`].
    #[display("`Property(id: {_0})` has no active `Mandate`")]
    NoActiveMandate(#[error(not(source))] property::Id),

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
            person, property, Contract,
        },
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, CreateLeaseContract, ExecutionError};

    fn cmd(property_id: property::Id) -> CreateLeaseContract {
        CreateLeaseContract {
            property_id,
            tenant_id: person::Id::new(),
            cosigner_id: None,
            starts_on: fixture::date(2024, 3, 1).coerce(),
            duration: contract::DurationMonths::new(12).unwrap(),
            canon: fixture::money(1_000_000),
            deposit: fixture::money(1_000_000),
            payment_day: contract::PaymentDay::new(5).unwrap(),
            actor: fixture::actor(),
        }
    }

    #[test]
    fn creates_active_lease_and_occupies_property() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        db.seed_property(property);
        db.seed_contract(fixture::mandate(property_id));

        let svc = fixture::service(db.clone());
        let contract = block_on(svc.execute(cmd(property_id))).unwrap();

        let Contract::Lease(lease) = contract else {
            panic!("expected a `Lease`");
        };
        assert_eq!(lease.status, lease::Status::Active);
        assert_eq!(lease.ends_on, fixture::date(2025, 3, 1).coerce());
        assert!(lease.expiry_alert);
        assert!(lease.ipc_alert);
        assert_eq!(
            db.property(property_id).unwrap().availability,
            property::Availability::Occupied,
        );
    }

    #[test]
    fn rejects_property_without_active_mandate() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        db.seed_property(property);

        let svc = fixture::service(db);
        let err = block_on(svc.execute(cmd(property_id))).unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NoActiveMandate(id) if *id == property_id,
        ));
    }

    #[test]
    fn rejects_second_active_lease_over_same_property() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        db.seed_property(property);
        db.seed_contract(fixture::mandate(property_id));
        db.seed_contract(fixture::lease(property_id));

        let svc = fixture::service(db);
        let err = block_on(svc.execute(cmd(property_id))).unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ActiveLeaseAlreadyExists(id)
                if *id == property_id,
        ));
    }

    #[test]
    fn rejects_unknown_property() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let property_id = property::Id::new();
        let err = block_on(svc.execute(cmd(property_id))).unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == property_id,
        ));
    }
}
