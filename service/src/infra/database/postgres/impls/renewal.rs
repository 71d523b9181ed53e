//! Renewal ledger [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Percent,
};
use tracerr::Traced;

use crate::{
    domain::{contract, renewal},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<renewal::Event>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(event): Insert<renewal::Event>,
    ) -> Result<Self::Ok, Self::Err> {
        let renewal::Event {
            id,
            contract_kind,
            contract_id,
            original_start,
            original_end,
            renewed_end,
            canon_before,
            canon_after,
            percent,
            reason,
            renewed_on,
            created_at,
            created_by,
        } = event;

        let percent_bp = percent.basis_points();

        const SQL: &str = "\
            INSERT INTO renewal_events (\
                id, contract_kind, contract_id, \
                original_start, original_end, renewed_end, \
                canon_before, canon_after, percent_bp, \
                reason, renewed_on, \
                created_at, created_by \
            ) VALUES (\
                $1::UUID, $2::INT2, $3::UUID, \
                $4::DATE, $5::DATE, $6::DATE, \
                $7::INT8, $8::INT8, $9::INT4, \
                $10::VARCHAR, $11::DATE, \
                $12::TIMESTAMPTZ, $13::VARCHAR \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &contract_kind,
                &contract_id,
                &original_start,
                &original_end,
                &renewed_end,
                &canon_before,
                &canon_after,
                &percent_bp,
                &reason,
                &renewed_on,
                &created_at,
                &created_by,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<renewal::Event>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<renewal::Event>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<renewal::Event>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let contract_id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_kind, contract_id, \
                   original_start, original_end, renewed_end, \
                   canon_before, canon_after, percent_bp, \
                   reason, renewed_on, \
                   created_at, created_by \
            FROM renewal_events \
            WHERE contract_id = $1::UUID \
            ORDER BY created_at DESC";
        Ok(self
            .query(SQL, &[&contract_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| renewal::Event {
                id: row.get("id"),
                contract_kind: row.get("contract_kind"),
                contract_id: row.get("contract_id"),
                original_start: row.get("original_start"),
                original_end: row.get("original_end"),
                renewed_end: row.get("renewed_end"),
                canon_before: row.get("canon_before"),
                canon_after: row.get("canon_after"),
                percent: Percent::from_basis_points(
                    row.get::<_, i32>("percent_bp"),
                )
                .expect("stored `percent_bp` is valid"),
                reason: row.get("reason"),
                renewed_on: row.get("renewed_on"),
                created_at: row.get("created_at"),
                created_by: row.get("created_by"),
            })
            .collect())
    }
}
