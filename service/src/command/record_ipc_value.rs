//! [`Command`] for recording a published index value.

use common::{operations::Insert, Date, Percent};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::ipc,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a published index value.
///
/// Values are keyed by year: recording an already known year overwrites it.
#[derive(Clone, Copy, Debug)]
pub struct RecordIpcValue {
    /// Year the value is published for.
    pub year: ipc::Year,

    /// Published index value.
    pub value: Percent,

    /// [`Date`] the value was published on.
    pub published_on: Date,

    /// Indicator whether the value may be used for indexation.
    pub is_active: bool,
}

impl<Db> Command<RecordIpcValue> for Service<Db>
where
    Db: Database<Insert<ipc::Record>, Err = Traced<database::Error>>,
{
    type Ok = ipc::Record;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RecordIpcValue) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordIpcValue {
            year,
            value,
            published_on,
            is_active,
        } = cmd;

        let record = ipc::Record {
            year,
            value,
            published_on,
            is_active,
        };
        self.database()
            .execute(Insert(record))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(record)
    }
}

/// Error of [`RecordIpcValue`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;

    use crate::{
        domain::ipc, fixture, infra::database::in_memory::InMemory, query,
    };

    use super::{Command as _, RecordIpcValue};

    fn cmd(year: i32, value: &str) -> RecordIpcValue {
        RecordIpcValue {
            year: year.into(),
            value: fixture::percent(value),
            published_on: fixture::date(year, 1, 5),
            is_active: true,
        }
    }

    #[test]
    fn rerecording_a_year_overwrites_its_value() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        block_on(svc.execute(cmd(2025, "9"))).unwrap();
        block_on(svc.execute(cmd(2025, "9.28"))).unwrap();

        let latest =
            block_on(svc.execute(query::ipc::Latest::by(ipc::Latest)))
                .unwrap()
                .unwrap();
        assert_eq!(latest.year, 2025.into());
        assert_eq!(latest.value, fixture::percent("9.28"));
    }

    #[test]
    fn latest_skips_inactive_records() {
        let db = InMemory::new();
        let svc = fixture::service(db);

        block_on(svc.execute(cmd(2024, "13.12"))).unwrap();
        let mut next = cmd(2025, "9.28");
        next.is_active = false;
        block_on(svc.execute(next)).unwrap();

        let latest =
            block_on(svc.execute(query::ipc::Latest::by(ipc::Latest)))
                .unwrap()
                .unwrap();
        assert_eq!(latest.year, 2024.into());
    }
}
