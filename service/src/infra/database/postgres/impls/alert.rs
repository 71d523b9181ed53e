//! [`Alert`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::alert::{self, Alert},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Alert>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(alert): Insert<Alert>,
    ) -> Result<Self::Ok, Self::Err> {
        let Alert {
            id,
            kind,
            description,
            contract_kind,
            contract_id,
            status,
            created_at,
            created_by,
        } = alert;

        const SQL: &str = "\
            INSERT INTO alerts (\
                id, kind, description, \
                contract_kind, contract_id, status, \
                created_at, created_by \
            ) VALUES (\
                $1::UUID, $2::INT2, $3::VARCHAR, \
                $4::INT2, $5::UUID, $6::INT2, \
                $7::TIMESTAMPTZ, $8::VARCHAR \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &kind,
                &description,
                &contract_kind,
                &contract_id,
                &status,
                &created_at,
                &created_by,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<Alert>, alert::Lookup>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Alert>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Alert>, alert::Lookup>>,
    ) -> Result<Self::Ok, Self::Err> {
        let alert::Lookup {
            kind,
            contract_kind,
            contract_id,
            created_on,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT id, kind, description, \
                   contract_kind, contract_id, status, \
                   created_at, created_by \
            FROM alerts \
            WHERE kind = $1::INT2 \
              AND contract_kind = $2::INT2 \
              AND contract_id = $3::UUID \
              AND status = $4::INT2 \
              AND created_at::DATE = $5::DATE \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[
                &kind,
                &contract_kind,
                &contract_id,
                &alert::Status::Pending,
                &created_on,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| {
            row.map(|row| Alert {
                id: row.get("id"),
                kind: row.get("kind"),
                description: row.get("description"),
                contract_kind: row.get("contract_kind"),
                contract_id: row.get("contract_id"),
                status: row.get("status"),
                created_at: row.get("created_at"),
                created_by: row.get("created_by"),
            })
        })
    }
}

impl<C> Database<Select<By<Vec<Alert>, alert::Status>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Alert>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Alert>, alert::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let status: alert::Status = by.into_inner();

        const SQL: &str = "\
            SELECT id, kind, description, \
                   contract_kind, contract_id, status, \
                   created_at, created_by \
            FROM alerts \
            WHERE status = $1::INT2 \
            ORDER BY created_at DESC";
        Ok(self
            .query(SQL, &[&status])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Alert {
                id: row.get("id"),
                kind: row.get("kind"),
                description: row.get("description"),
                contract_kind: row.get("contract_kind"),
                contract_id: row.get("contract_id"),
                status: row.get("status"),
                created_at: row.get("created_at"),
                created_by: row.get("created_by"),
            })
            .collect())
    }
}
