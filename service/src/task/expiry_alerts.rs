//! [`ExpiryAlerts`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Insert, Perform, Select, Start},
    Date, DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        alert,
        contract::{self, Lease},
        person, Alert, Contract,
    },
    infra::{database, Database},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::contract::Mandate;

use super::Task;

/// Day offsets before a [`Contract`] end date an expiry [`Alert`] is raised
/// at.
const EXPIRY_OFFSETS: [i64; 4] = [90, 60, 30, 0];

/// Days ahead of a [`Lease`] start date anniversary an indexation [`Alert`]
/// is raised.
const IPC_LEAD_DAYS: i64 = 60;

/// Configuration for [`ExpiryAlerts`] [`Task`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Interval between [`Alert`] sweeps.
    pub interval: time::Duration,

    /// [`Actor`] the raised [`Alert`]s are attributed to.
    ///
    /// [`Actor`]: person::Actor
    pub actor: person::Actor,
}

/// [`Task`] raising [`Alert`]s for [`Contract`]s approaching their end date
/// or indexation anniversary.
///
/// Sweeps are idempotent within a calendar day: an [`Alert`] already raised
/// today for the same [`Contract`] and [`alert::Kind`] is not raised again.
#[derive(Clone, Debug)]
pub struct ExpiryAlerts<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ExpiryAlerts<Self>, Config>>> for Service<Db>
where
    ExpiryAlerts<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpiryAlerts<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ExpiryAlerts {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ExpiryAlerts` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ExpiryAlerts<Service<Db>>
where
    Db: Database<
            Select<By<Vec<Contract>, contract::EndDate>>,
            Ok = Vec<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Lease>, read::contract::AnniversaryOn>>,
            Ok = Vec<Lease>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Alert>, alert::Lookup>>,
            Ok = Option<Alert>,
            Err = Traced<database::Error>,
        > + Database<Insert<Alert>, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let db = self.service.database();
        let today = Date::today();

        for offset in EXPIRY_OFFSETS {
            let ends_on = today.shift_days(offset).coerce();
            let contracts = db
                .execute(Select(By::<Vec<Contract>, _>::new(ends_on)))
                .await
                .map_err(tracerr::map_from_and_wrap!())?;
            for contract in contracts {
                let kind = match contract.kind() {
                    contract::Kind::Mandate => alert::Kind::MandateExpiry,
                    contract::Kind::Lease => alert::Kind::LeaseExpiry,
                };
                let raised_today = db
                    .execute(Select(By::<Option<Alert>, _>::new(
                        alert::Lookup {
                            kind,
                            contract_kind: contract.kind(),
                            contract_id: contract.id(),
                            created_on: today,
                        },
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!())?;
                if raised_today.is_some() {
                    continue;
                }

                db.execute(Insert(Alert {
                    id: alert::Id::new(),
                    kind,
                    description: format!(
                        "`{}` contract `{}` ends on {}",
                        contract.kind(),
                        contract.id(),
                        contract.ends_on(),
                    )
                    .into(),
                    contract_kind: contract.kind(),
                    contract_id: contract.id(),
                    status: alert::Status::Pending,
                    created_at: DateTime::now().coerce(),
                    created_by: self.config.actor.clone(),
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!())
                .map(drop)?;
            }
        }

        // A lease ending right on the anniversary is covered by the expiry
        // sweep above, so is excluded here.
        let anniversary = today.shift_days(IPC_LEAD_DAYS);
        let leases = db
            .execute(Select(By::<Vec<Lease>, _>::new(
                read::contract::AnniversaryOn {
                    month_day: anniversary.month_day(),
                    beyond: anniversary,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        for lease in leases {
            let raised_today = db
                .execute(Select(By::<Option<Alert>, _>::new(alert::Lookup {
                    kind: alert::Kind::IpcAnniversary,
                    contract_kind: contract::Kind::Lease,
                    contract_id: lease.id,
                    created_on: today,
                })))
                .await
                .map_err(tracerr::map_from_and_wrap!())?;
            if raised_today.is_some() {
                continue;
            }

            db.execute(Insert(Alert {
                id: alert::Id::new(),
                kind: alert::Kind::IpcAnniversary,
                description: format!(
                    "`Lease` contract `{}` reaches its indexation \
                     anniversary on {anniversary}",
                    lease.id,
                )
                .into(),
                contract_kind: contract::Kind::Lease,
                contract_id: lease.id,
                status: alert::Status::Pending,
                created_at: DateTime::now().coerce(),
                created_by: self.config.actor.clone(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!())
            .map(drop)?;
        }

        Ok(())
    }
}

/// Error of [`ExpiryAlerts`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use common::{operations::Perform, Date};
    use futures::executor::block_on;

    use crate::{
        domain::{alert, contract::Lease},
        fixture,
        infra::database::in_memory::InMemory,
        Service, Task as _,
    };

    use super::ExpiryAlerts;

    fn task(svc: Service<InMemory>) -> ExpiryAlerts<Service<InMemory>> {
        ExpiryAlerts {
            config: svc.config().expiry_alerts.clone(),
            service: svc,
        }
    }

    /// Returns an active [`Lease`] whose start date anniversary falls
    /// exactly [`IPC_LEAD_DAYS`] from today.
    ///
    /// [`IPC_LEAD_DAYS`]: super::IPC_LEAD_DAYS
    fn anniversary_lease(db: &InMemory) -> Lease {
        let anniversary = Date::today().shift_days(super::IPC_LEAD_DAYS);
        let property = fixture::property();
        let mut lease = fixture::lease(property.id);
        lease.starts_on = (1..=4)
            .find_map(|back| {
                Date::from_calendar_date(
                    anniversary.year() - back,
                    anniversary.month(),
                    anniversary.day(),
                )
            })
            .unwrap()
            .coerce();
        lease.ends_on = anniversary.shift_days(300).coerce();
        db.seed_property(property);
        lease
    }

    #[test]
    fn raises_expiry_alerts_at_each_offset() {
        let db = InMemory::new();
        let today = Date::today();

        let property = fixture::property();
        let mut mandate = fixture::mandate(property.id);
        mandate.ends_on = today.shift_days(90).coerce();
        let mandate_id = mandate.id;
        let mut lease = fixture::lease(property.id);
        lease.ends_on = today.shift_days(30).coerce();
        let lease_id = lease.id;
        let other_property = fixture::property();
        let mut off_schedule = fixture::lease(other_property.id);
        off_schedule.ends_on = today.shift_days(10).coerce();
        db.seed_property(property);
        db.seed_property(other_property);
        db.seed_contract(mandate);
        db.seed_contract(lease);
        db.seed_contract(off_schedule);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();

        let alerts = db.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| {
            a.kind == alert::Kind::MandateExpiry && a.contract_id == mandate_id
        }));
        assert!(alerts.iter().any(|a| {
            a.kind == alert::Kind::LeaseExpiry && a.contract_id == lease_id
        }));
    }

    #[test]
    fn repeated_sweeps_raise_no_duplicates() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut mandate = fixture::mandate(property.id);
        mandate.ends_on = Date::today().coerce();
        db.seed_property(property);
        db.seed_contract(mandate);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();
        block_on(task.execute(Perform(()))).unwrap();

        assert_eq!(db.alerts().len(), 1);
    }

    #[test]
    fn raises_anniversary_alert_with_lead() {
        let db = InMemory::new();
        let lease = anniversary_lease(&db);
        let lease_id = lease.id;
        db.seed_contract(lease);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();

        let alerts = db.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, alert::Kind::IpcAnniversary);
        assert_eq!(alerts[0].contract_id, lease_id);
    }

    #[test]
    fn lease_ending_on_anniversary_gets_expiry_alert_only() {
        let db = InMemory::new();
        let mut lease = anniversary_lease(&db);
        lease.ends_on = Date::today()
            .shift_days(super::IPC_LEAD_DAYS)
            .coerce();
        db.seed_contract(lease);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();

        let alerts = db.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, alert::Kind::LeaseExpiry);
    }

    #[test]
    fn prior_increment_does_not_suppress_later_anniversary_alerts() {
        let db = InMemory::new();
        let mut lease = anniversary_lease(&db);
        lease.ipc_alert = false;
        lease.last_increment_on = Some(Date::today().shift_days(-200));
        let lease_id = lease.id;
        db.seed_contract(lease);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();

        let alerts = db.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, alert::Kind::IpcAnniversary);
        assert_eq!(alerts[0].contract_id, lease_id);
    }

    #[test]
    fn expiry_alert_is_raised_regardless_of_contract_flags() {
        let db = InMemory::new();
        let property = fixture::property();
        let mut mandate = fixture::mandate(property.id);
        mandate.ends_on = Date::today().coerce();
        mandate.expiry_alert = false;
        let mandate_id = mandate.id;
        db.seed_property(property);
        db.seed_contract(mandate);

        let task = task(fixture::service(db.clone()));
        block_on(task.execute(Perform(()))).unwrap();

        let alerts = db.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, alert::Kind::MandateExpiry);
        assert_eq!(alerts[0].contract_id, mandate_id);
    }
}
