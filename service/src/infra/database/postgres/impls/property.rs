//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, lease, mandate},
        property, Property,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, address, availability, \
                   estimated_canon, administration_fee, \
                   created_at, updated_at \
            FROM properties \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Property {
                        id,
                        address: row.get("address"),
                        availability: row.get("availability"),
                        estimated_canon: row.get("estimated_canon"),
                        administration_fee: row.get("administration_fee"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            address,
            availability,
            estimated_canon,
            administration_fee,
            created_at,
            updated_at,
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, address, availability, \
                estimated_canon, administration_fee, \
                created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::INT2, \
                $4::INT8, $5::INT8, \
                $6::TIMESTAMPTZ, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET address = EXCLUDED.address, \
                availability = EXCLUDED.availability, \
                estimated_canon = EXCLUDED.estimated_canon, \
                administration_fee = EXCLUDED.administration_fee, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &address,
                &availability,
                &estimated_canon,
                &administration_fee,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO properties_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<Vec<Property>, read::property::WithoutActiveMandate>>,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Property>, read::property::WithoutActiveMandate>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::WithoutActiveMandate = by.into_inner();

        const SQL: &str = "\
            SELECT p.id \
            FROM properties AS p \
            WHERE NOT EXISTS (\
                SELECT 1 \
                FROM contracts AS m \
                WHERE m.property_id = p.id \
                  AND m.kind = $1::INT2 \
                  AND m.status = $2::INT2\
            ) \
            ORDER BY p.address ASC";
        let ids = self
            .query(SQL, &[&contract::Kind::Mandate, &mandate::Status::Active])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let mut properties = self
            .execute(Select(By::<HashMap<property::Id, Property>, _>::new(
                ids.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| properties.remove(id)).collect())
    }
}

impl<C> Database<Select<By<Vec<Property>, read::property::EligibleForLease>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Property>, read::property::EligibleForLease>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::EligibleForLease = by.into_inner();

        const SQL: &str = "\
            SELECT p.id \
            FROM properties AS p \
            WHERE EXISTS (\
                SELECT 1 \
                FROM contracts AS m \
                WHERE m.property_id = p.id \
                  AND m.kind = $1::INT2 \
                  AND m.status = $2::INT2\
            ) \
            AND NOT EXISTS (\
                SELECT 1 \
                FROM contracts AS l \
                WHERE l.property_id = p.id \
                  AND l.kind = $3::INT2 \
                  AND l.status = $4::INT2\
            ) \
            ORDER BY p.address ASC";
        let ids = self
            .query(
                SQL,
                &[
                    &contract::Kind::Mandate,
                    &mandate::Status::Active,
                    &contract::Kind::Lease,
                    &lease::Status::Active,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let mut properties = self
            .execute(Select(By::<HashMap<property::Id, Property>, _>::new(
                ids.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| properties.remove(id)).collect())
    }
}
