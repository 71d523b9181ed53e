//! [`Command`] for creating a new [`Mandate`] [`Contract`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, mandate, Mandate},
        person, property, Contract, Property,
    },
    infra::{database, Database},
    read::contract::Active,
    Service,
};

use super::Command;

/// Partial unique index backstopping the single active [`Mandate`] per
/// [`Property`] rule at the schema level.
const ONE_ACTIVE_MANDATE_IDX: &str =
    "contracts_one_active_mandate_per_property";

/// [`Command`] for creating a new [`Mandate`] [`Contract`].
#[derive(Clone, Debug)]
pub struct CreateMandateContract {
    /// ID of the [`Property`] to manage.
    pub property_id: property::Id,

    /// ID of the person owning the [`Property`].
    pub owner_id: person::Id,

    /// ID of the advisor handling the new [`Contract`].
    pub advisor_id: person::Id,

    /// [`Date`] the new [`Contract`] starts on.
    ///
    /// [`Date`]: common::Date
    pub starts_on: contract::StartDate,

    /// Agreed term of the new [`Contract`].
    pub duration: contract::DurationMonths,

    /// Monthly canon agreed in the new [`Contract`].
    pub canon: Money,

    /// Agency commission rate of the new [`Contract`].
    pub commission: mandate::FeeRate,

    /// VAT rate applied to the commission, defaulting to
    /// [`FeeRate::DEFAULT_VAT`] if not provided.
    ///
    /// [`FeeRate::DEFAULT_VAT`]: mandate::FeeRate::DEFAULT_VAT
    pub vat: Option<mandate::FeeRate>,

    /// [`Actor`] creating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<CreateMandateContract> for Service<Db>
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
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateMandateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateMandateContract {
            property_id,
            owner_id,
            advisor_id,
            starts_on,
            duration,
            canon,
            commission,
            vat,
            actor,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(property.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if tx
            .execute(Select(By::<Option<Active<Mandate>>, _>::new(property.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::ActiveMandateAlreadyExists(
                property.id
            )));
        }

        let now = DateTime::now();
        let contract = Contract::from(Mandate {
            id: contract::Id::new(),
            property_id: property.id,
            owner_id,
            advisor_id,
            starts_on,
            ends_on: starts_on.coerce().shift_months(duration.months()),
            duration,
            canon,
            commission,
            vat: vat.unwrap_or(mandate::FeeRate::DEFAULT_VAT),
            status: mandate::Status::Active,
            cancellation_reason: None,
            expiry_alert: true,
            renewed_on: None,
            created_at: now.coerce(),
            created_by: actor.clone(),
            updated_at: now.coerce(),
            updated_by: actor,
        });
        tx.execute(Insert(contract.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_unique_violation(Some(ONE_ACTIVE_MANDATE_IDX))
                {
                    tracerr::new!(E::ActiveMandateAlreadyExists(property.id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`CreateMandateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Property`] already has an active [`Mandate`] [`Contract`].
    #[display("`Property(id: {_0})` already has an active `Mandate`")]
    ActiveMandateAlreadyExists(#[error(not(source))] property::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;

    use crate::{
        domain::{
            contract::{self, mandate},
            person, property, Contract,
        },
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, CreateMandateContract, ExecutionError};

    fn cmd(property_id: property::Id) -> CreateMandateContract {
        CreateMandateContract {
            property_id,
            owner_id: person::Id::new(),
            advisor_id: person::Id::new(),
            starts_on: fixture::date(2024, 1, 31).coerce(),
            duration: contract::DurationMonths::new(12).unwrap(),
            canon: fixture::money(1_200_000),
            commission: mandate::FeeRate::new(800).unwrap(),
            vat: None,
            actor: fixture::actor(),
        }
    }

    #[test]
    fn creates_active_mandate_with_computed_end_date() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        db.seed_property(property);

        let svc = fixture::service(db.clone());
        let contract = block_on(svc.execute(cmd(property_id))).unwrap();

        let Contract::Mandate(mandate) = contract else {
            panic!("expected a `Mandate`");
        };
        assert_eq!(mandate.status, mandate::Status::Active);
        assert_eq!(mandate.ends_on, fixture::date(2025, 1, 31).coerce());
        assert_eq!(mandate.vat, mandate::FeeRate::DEFAULT_VAT);
        assert!(mandate.expiry_alert);
        assert!(db.contract(mandate.id).is_some());
    }

    #[test]
    fn rejects_second_active_mandate_over_same_property() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        db.seed_property(property);
        db.seed_contract(fixture::mandate(property_id));

        let svc = fixture::service(db);
        let err = block_on(svc.execute(cmd(property_id))).unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ActiveMandateAlreadyExists(id)
                if *id == property_id,
        ));
    }

    #[test]
    fn allows_new_mandate_once_previous_is_cancelled() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        let mut previous = fixture::mandate(property_id);
        previous.status = mandate::Status::Cancelled;
        db.seed_property(property);
        db.seed_contract(previous);

        let svc = fixture::service(db);
        assert!(block_on(svc.execute(cmd(property_id))).is_ok());
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
