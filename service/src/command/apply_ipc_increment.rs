//! [`Command`] for applying an index increment to a [`Lease`] canon,
//! cascading onto the [`Property`] and its active [`Mandate`].

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
    domain::{
        contract::{self, Mandate},
        ipc, person, property, Contract, Property,
    },
    infra::{database, Database},
    read::contract::Active,
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Lease;

use super::Command;

/// [`Command`] for applying an index increment to a [`Lease`] canon.
///
/// The new canon cascades onto the estimated canon of the [`Property`] and
/// onto the canon of its active [`Mandate`], all inside one transaction.
#[derive(Clone, Debug)]
pub struct ApplyIpcIncrement {
    /// ID of the [`Lease`] [`Contract`] to index.
    pub lease_id: contract::Id,

    /// [`Percent`] to increase the canon by.
    pub percent: Percent,

    /// [`Date`] the indexation takes effect on.
    pub effective_on: Date,

    /// Free-form notes to attach to the recorded [`ipc::Increment`].
    pub notes: Option<String>,

    /// [`Actor`] applying the indexation.
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

/// Highest [`Percent`] accepted by [`ApplyIpcIncrement`], in basis points.
const MAX_PERCENT_BP: i32 = 2_000;

impl<Db> Command<ApplyIpcIncrement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Insert<ipc::Increment>, Err = Traced<database::Error>>,
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
        > + Database<
            Select<By<Option<Active<Mandate>>, property::Id>>,
            Ok = Option<Active<Mandate>>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ipc::Increment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApplyIpcIncrement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApplyIpcIncrement {
            lease_id,
            percent,
            effective_on,
            notes,
            actor,
        } = cmd;

        if percent.is_zero() || percent.basis_points() > MAX_PERCENT_BP {
            return Err(tracerr::new!(E::PercentOutOfRange(percent)));
        }

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
        if lease
            .last_increment_on
            .is_some_and(|last| last.same_month(&effective_on))
        {
            return Err(tracerr::new!(E::AlreadyAppliedThisMonth(lease_id)));
        }

        let canon_before = lease.canon;
        let canon_after = canon_before + canon_before.percent_of(percent);

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(lease.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(lease.property_id))
            .map_err(tracerr::wrap!())?;

        let mandate = tx
            .execute(Select(By::<Option<Active<Mandate>>, _>::new(
                lease.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        lease.canon = canon_after;
        lease.last_increment_on = Some(effective_on);
        lease.ipc_alert = false;
        lease.updated_at = now.coerce();
        lease.updated_by = actor.clone();
        tx.execute(Update(Contract::from(lease)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        property.estimated_canon = canon_after;
        property.updated_at = now.coerce();
        tx.execute(Update(property))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(Active(mut mandate)) = mandate {
            mandate.canon = canon_after;
            mandate.updated_at = now.coerce();
            mandate.updated_by = actor.clone();
            tx.execute(Update(Contract::from(mandate)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let increment = ipc::Increment {
            id: ipc::Id::new(),
            lease_id,
            applied_on: effective_on,
            value: percent,
            canon_before,
            canon_after,
            notes,
            created_at: DateTime::now().coerce(),
            created_by: actor,
        };

        // History is best-effort: the indexation itself is committed
        // already, so a failure here is logged and swallowed.
        if let Err(e) = self
            .database()
            .execute(Insert(increment.clone()))
            .await
        {
            log::warn!(
                lease_id = %lease_id,
                "failed to record indexation history: {e}",
            );
        }

        Ok(increment)
    }
}

/// Error of [`ApplyIpcIncrement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Indexation was already applied to the [`Lease`] this calendar month.
    #[display("`Lease(id: {_0})` was indexed this month already")]
    AlreadyAppliedThisMonth(#[error(not(source))] contract::Id),

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

    /// Provided [`Percent`] is out of the accepted `(0%, 20%]` range.
    #[display("percent `{_0}` is out of the accepted (0%, 20%] range")]
    PercentOutOfRange(#[error(not(source))] Percent),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use common::Percent;
    use futures::executor::block_on;

    use crate::{
        domain::Contract,
        fixture,
        infra::database::in_memory::InMemory,
    };

    use super::{ApplyIpcIncrement, Command as _, ExecutionError};

    #[test]
    fn cascades_onto_property_and_mandate() {
        let db = InMemory::new();
        let property = fixture::property();
        let property_id = property.id;
        let mandate = fixture::mandate(property_id);
        let mandate_id = mandate.id;
        let lease = fixture::lease(property_id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(mandate);
        db.seed_contract(lease);

        let svc = fixture::service(db.clone());
        let increment = block_on(svc.execute(ApplyIpcIncrement {
            lease_id,
            percent: fixture::percent("9"),
            effective_on: fixture::date(2025, 3, 10),
            notes: None,
            actor: fixture::actor(),
        }))
        .unwrap();

        assert_eq!(increment.canon_before, fixture::money(1_000_000));
        assert_eq!(increment.canon_after, fixture::money(1_090_000));

        let Some(Contract::Lease(lease)) = db.contract(lease_id) else {
            panic!("expected a `Lease`");
        };
        assert_eq!(lease.canon, fixture::money(1_090_000));
        assert_eq!(lease.last_increment_on, Some(fixture::date(2025, 3, 10)));
        assert!(!lease.ipc_alert);

        assert_eq!(
            db.property(property_id).unwrap().estimated_canon,
            fixture::money(1_090_000),
        );

        let Some(Contract::Mandate(mandate)) = db.contract(mandate_id) else {
            panic!("expected a `Mandate`");
        };
        assert_eq!(mandate.canon, fixture::money(1_090_000));

        assert_eq!(db.increments().len(), 1);
    }

    #[test]
    fn rejects_second_indexation_within_same_month() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut lease = fixture::lease(property.id);
        lease.last_increment_on = Some(fixture::date(2025, 3, 5));
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);

        let svc = fixture::service(db);
        let err = block_on(svc.execute(ApplyIpcIncrement {
            lease_id,
            percent: fixture::percent("9"),
            effective_on: fixture::date(2025, 3, 20),
            notes: None,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyAppliedThisMonth(id) if *id == lease_id,
        ));
    }

    #[test]
    fn rejects_out_of_range_percent() {
        let db = InMemory::new();
        let property = fixture::property();
        let lease = fixture::lease(property.id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);

        let svc = fixture::service(db);
        for percent in [Percent::ZERO, fixture::percent("20.01")] {
            let err = block_on(svc.execute(ApplyIpcIncrement {
                lease_id,
                percent,
                effective_on: fixture::date(2025, 3, 10),
                notes: None,
                actor: fixture::actor(),
            }))
            .unwrap_err();

            assert!(matches!(
                err.as_ref(),
                ExecutionError::PercentOutOfRange(_),
            ));
        }
    }

    #[test]
    fn failed_cascade_leaves_lease_untouched() {
        let db = InMemory::new();
        let property = fixture::property();
        let lease = fixture::lease(property.id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);
        db.fail_property_updates();

        let svc = fixture::service(db.clone());
        let err = block_on(svc.execute(ApplyIpcIncrement {
            lease_id,
            percent: fixture::percent("9"),
            effective_on: fixture::date(2025, 3, 10),
            notes: None,
            actor: fixture::actor(),
        }))
        .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));

        // Nothing was committed, the canon stays as it was.
        let Some(Contract::Lease(lease)) = db.contract(lease_id) else {
            panic!("expected a `Lease`");
        };
        assert_eq!(lease.canon, fixture::money(1_000_000));
        assert_eq!(lease.last_increment_on, None);
        assert!(db.increments().is_empty());
    }

    #[test]
    fn history_failure_does_not_undo_indexation() {
        let db = InMemory::new();
        let property = fixture::property();
        let lease = fixture::lease(property.id);
        let lease_id = lease.id;
        db.seed_property(property);
        db.seed_contract(lease);
        db.fail_increment_inserts();

        let svc = fixture::service(db.clone());
        let increment = block_on(svc.execute(ApplyIpcIncrement {
            lease_id,
            percent: fixture::percent("9"),
            effective_on: fixture::date(2025, 3, 10),
            notes: None,
            actor: fixture::actor(),
        }))
        .unwrap();

        assert_eq!(increment.canon_after, fixture::money(1_090_000));

        let Some(Contract::Lease(lease)) = db.contract(lease_id) else {
            panic!("expected a `Lease`");
        };
        assert_eq!(lease.canon, fixture::money(1_090_000));
        assert!(db.increments().is_empty());
    }
}
