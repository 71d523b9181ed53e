//! [`Command`] for updating an existing [`Mandate`] [`Contract`].

use common::{
    operations::{
        By, Commit, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, mandate},
        person, property, Contract,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Mandate;

use super::Command;

/// [`Command`] for updating an existing [`Mandate`] [`Contract`].
///
/// Only the provided fields are changed, the rest are kept as is.
#[derive(Clone, Debug)]
pub struct UpdateMandateContract {
    /// ID of the [`Contract`] to be updated.
    pub mandate_id: contract::Id,

    /// New ID of the managed [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: Option<property::Id>,

    /// New ID of the person owning the [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    pub owner_id: Option<person::Id>,

    /// New ID of the advisor handling the [`Contract`].
    pub advisor_id: Option<person::Id>,

    /// New start [`Date`] of the [`Contract`].
    ///
    /// [`Date`]: common::Date
    pub starts_on: Option<contract::StartDate>,

    /// New end [`Date`] of the [`Contract`].
    ///
    /// [`Date`]: common::Date
    pub ends_on: Option<contract::EndDate>,

    /// New agreed term of the [`Contract`].
    pub duration: Option<contract::DurationMonths>,

    /// New monthly canon of the [`Contract`].
    pub canon: Option<Money>,

    /// New agency commission rate of the [`Contract`].
    pub commission: Option<mandate::FeeRate>,

    /// [`Actor`] updating the [`Contract`].
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

impl<Db> Command<UpdateMandateContract> for Service<Db>
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
        cmd: UpdateMandateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateMandateContract {
            mandate_id,
            property_id,
            owner_id,
            advisor_id,
            starts_on,
            ends_on,
            duration,
            canon,
            commission,
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

        if let Some(id) = property_id {
            mandate.property_id = id;
        }
        if let Some(id) = owner_id {
            mandate.owner_id = id;
        }
        if let Some(id) = advisor_id {
            mandate.advisor_id = id;
        }
        if let Some(date) = starts_on {
            mandate.starts_on = date;
        }
        if let Some(date) = ends_on {
            mandate.ends_on = date;
        }
        if let Some(months) = duration {
            mandate.duration = months;
        }
        if let Some(amount) = canon {
            mandate.canon = amount;
        }
        if let Some(rate) = commission {
            mandate.commission = rate;
        }
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

/// Error of [`UpdateMandateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

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
            person, Contract,
        },
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{Command as _, ExecutionError, UpdateMandateContract};

    #[test]
    fn merges_only_the_provided_fields() {
        let db = InMemory::new();
        let property = fixture::property();
        let mandate = fixture::mandate(property.id);
        let mandate_id = mandate.id;
        let owner_id = mandate.owner_id;
        db.seed_property(property);
        db.seed_contract(mandate);

        let advisor_id = person::Id::new();
        let svc = fixture::service(db.clone());
        block_on(svc.execute(UpdateMandateContract {
            mandate_id,
            property_id: None,
            owner_id: None,
            advisor_id: Some(advisor_id),
            starts_on: None,
            ends_on: None,
            duration: None,
            canon: Some(fixture::money(1_200_000)),
            commission: Some(mandate::FeeRate::new(1000).unwrap()),
            actor: fixture::actor(),
        }))
        .unwrap();

        let Some(Contract::Mandate(mandate)) = db.contract(mandate_id) else {
            panic!("expected a `Mandate`");
        };
        assert_eq!(mandate.advisor_id, advisor_id);
        assert_eq!(mandate.canon, fixture::money(1_200_000));
        assert_eq!(mandate.commission, mandate::FeeRate::new(1000).unwrap());
        assert_eq!(mandate.owner_id, owner_id);
        assert_eq!(mandate.ends_on, fixture::date(2025, 1, 15).coerce());
        assert_eq!(mandate.updated_by, fixture::actor());
    }

    #[test]
    fn rejects_unknown_mandate() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        let mandate_id = contract::Id::new();
        let err = block_on(svc.execute(UpdateMandateContract {
            mandate_id,
            property_id: None,
            owner_id: None,
            advisor_id: None,
            starts_on: None,
            ends_on: None,
            duration: None,
            canon: None,
            commission: None,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MandateNotExists(id) if *id == mandate_id,
        ));
    }
}
