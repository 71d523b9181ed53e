//! IPC-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::ipc,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<ipc::Record>, ipc::Latest>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<ipc::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ipc::Record>, ipc::Latest>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ipc::Latest = by.into_inner();

        const SQL: &str = "\
            SELECT year, value, published_on, is_active \
            FROM ipc_records \
            WHERE is_active \
            ORDER BY year DESC \
            LIMIT 1";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| ipc::Record {
                    year: row.get("year"),
                    value: row.get("value"),
                    published_on: row.get("published_on"),
                    is_active: row.get("is_active"),
                })
            })
    }
}

impl<C> Database<Select<By<Option<ipc::Record>, ipc::Year>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<ipc::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ipc::Record>, ipc::Year>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let year: ipc::Year = by.into_inner();

        const SQL: &str = "\
            SELECT year, value, published_on, is_active \
            FROM ipc_records \
            WHERE year = $1::INT4 \
            LIMIT 1";
        self.query_opt(SQL, &[&year])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| ipc::Record {
                    year: row.get("year"),
                    value: row.get("value"),
                    published_on: row.get("published_on"),
                    is_active: row.get("is_active"),
                })
            })
    }
}

impl<C> Database<Insert<ipc::Record>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<ipc::Record>,
    ) -> Result<Self::Ok, Self::Err> {
        let ipc::Record {
            year,
            value,
            published_on,
            is_active,
        } = record;

        const SQL: &str = "\
            INSERT INTO ipc_records (\
                year, value, published_on, is_active \
            ) VALUES (\
                $1::INT4, $2::NUMERIC, $3::DATE, $4::BOOLEAN \
            ) \
            ON CONFLICT (year) DO UPDATE \
            SET value = EXCLUDED.value, \
                published_on = EXCLUDED.published_on, \
                is_active = EXCLUDED.is_active";
        self.exec(SQL, &[&year, &value, &published_on, &is_active])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<ipc::Increment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(increment): Insert<ipc::Increment>,
    ) -> Result<Self::Ok, Self::Err> {
        let ipc::Increment {
            id,
            lease_id,
            applied_on,
            value,
            canon_before,
            canon_after,
            notes,
            created_at,
            created_by,
        } = increment;

        const SQL: &str = "\
            INSERT INTO ipc_increments (\
                id, lease_id, applied_on, value, \
                canon_before, canon_after, notes, \
                created_at, created_by \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::DATE, $4::NUMERIC, \
                $5::INT8, $6::INT8, $7::VARCHAR, \
                $8::TIMESTAMPTZ, $9::VARCHAR \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &lease_id,
                &applied_on,
                &value,
                &canon_before,
                &canon_after,
                &notes,
                &created_at,
                &created_by,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
