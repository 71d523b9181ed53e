//! [`Contract`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Date, Money, Percent,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{
        contract::{self, lease, mandate, Lease, Mandate},
        ipc, person, property, Contract,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, contract::Active},
};

impl<C, IDs> Database<Select<By<HashMap<contract::Id, Contract>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[contract::Id]>,
{
    type Ok = HashMap<contract::Id, Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<contract::Id, Contract>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[contract::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        #[expect(clippy::items_after_statements, reason = "more readable")]
        const SQL: &str = "\
            SELECT id, kind, property_id, \
                   owner_id, advisor_id, tenant_id, cosigner_id, \
                   starts_on, ends_on, duration_months, \
                   canon, deposit, payment_day, \
                   commission, vat, \
                   status, cancellation_reason, \
                   expiry_alert, ipc_alert, \
                   renewed_on, last_increment_on, \
                   created_at, created_by, updated_at, updated_by \
            FROM contracts \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                let property_id = row.get("property_id");
                let starts_on = row.get("starts_on");
                let ends_on = row.get("ends_on");
                let duration = contract::DurationMonths::new(
                    u32::try_from(row.get::<_, i32>("duration_months"))
                        .expect("`duration_months` overflow"),
                )
                .expect("stored `duration_months` is valid");
                let canon = row.get::<_, Money>("canon");
                let cancellation_reason = row.get("cancellation_reason");
                let expiry_alert = row.get("expiry_alert");
                let renewed_on = row.get("renewed_on");
                let created_at = row.get("created_at");
                let created_by = row.get("created_by");
                let updated_at = row.get("updated_at");
                let updated_by = row.get("updated_by");
                let contract = match row.get("kind") {
                    contract::Kind::Mandate => Mandate {
                        id,
                        property_id,
                        owner_id: row.get("owner_id"),
                        advisor_id: row.get("advisor_id"),
                        starts_on,
                        ends_on,
                        duration,
                        canon,
                        commission: row.get("commission"),
                        vat: row.get("vat"),
                        status: row.get::<_, mandate::Status>("status"),
                        cancellation_reason,
                        expiry_alert,
                        renewed_on,
                        created_at,
                        created_by,
                        updated_at,
                        updated_by,
                    }
                    .into(),
                    contract::Kind::Lease => Lease {
                        id,
                        property_id,
                        tenant_id: row.get("tenant_id"),
                        cosigner_id: row.get("cosigner_id"),
                        starts_on,
                        ends_on,
                        duration,
                        canon,
                        deposit: row.get("deposit"),
                        payment_day: contract::PaymentDay::new(
                            u8::try_from(row.get::<_, i16>("payment_day"))
                                .expect("`payment_day` overflow"),
                        )
                        .expect("stored `payment_day` is valid"),
                        status: row.get::<_, lease::Status>("status"),
                        cancellation_reason,
                        expiry_alert,
                        ipc_alert: row.get("ipc_alert"),
                        renewed_on,
                        last_increment_on: row.get("last_increment_on"),
                        created_at,
                        created_by,
                        updated_at,
                        updated_by,
                    }
                    .into(),
                };
                (id, contract)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<contract::Id, Contract>, [contract::Id; 1]>>,
        Ok = HashMap<contract::Id, Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Contract>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(contract))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        #[expect(clippy::type_complexity, reason = "still readable")]
        let (
            id,
            kind,
            property_id,
            owner_id,
            advisor_id,
            tenant_id,
            cosigner_id,
            starts_on,
            ends_on,
            duration_months,
            canon,
            deposit,
            payment_day,
            commission,
            vat,
            status,
            cancellation_reason,
            expiry_alert,
            ipc_alert,
            renewed_on,
            last_increment_on,
            created_at,
            created_by,
            updated_at,
            updated_by,
        ): (
            contract::Id,
            contract::Kind,
            property::Id,
            Option<person::Id>,
            Option<person::Id>,
            Option<person::Id>,
            Option<person::Id>,
            contract::StartDate,
            contract::EndDate,
            i32,
            Money,
            Option<Money>,
            Option<i16>,
            Option<mandate::FeeRate>,
            Option<mandate::FeeRate>,
            i16,
            Option<contract::CancellationReason>,
            bool,
            Option<bool>,
            Option<Date>,
            Option<Date>,
            contract::CreationDateTime,
            person::Actor,
            contract::ModificationDateTime,
            person::Actor,
        ) = match contract {
            Contract::Mandate(c) => (
                c.id,
                contract::Kind::Mandate,
                c.property_id,
                Some(c.owner_id),
                Some(c.advisor_id),
                None,
                None,
                c.starts_on,
                c.ends_on,
                i32::try_from(c.duration.months()).unwrap(),
                c.canon,
                None,
                None,
                Some(c.commission),
                Some(c.vat),
                i16::from(c.status.u8()),
                c.cancellation_reason,
                c.expiry_alert,
                None,
                c.renewed_on,
                None,
                c.created_at,
                c.created_by,
                c.updated_at,
                c.updated_by,
            ),
            Contract::Lease(c) => (
                c.id,
                contract::Kind::Lease,
                c.property_id,
                None,
                None,
                Some(c.tenant_id),
                c.cosigner_id,
                c.starts_on,
                c.ends_on,
                i32::try_from(c.duration.months()).unwrap(),
                c.canon,
                Some(c.deposit),
                Some(i16::from(c.payment_day.get())),
                None,
                None,
                i16::from(c.status.u8()),
                c.cancellation_reason,
                c.expiry_alert,
                Some(c.ipc_alert),
                c.renewed_on,
                c.last_increment_on,
                c.created_at,
                c.created_by,
                c.updated_at,
                c.updated_by,
            ),
        };

        const SQL: &str = "\
            INSERT INTO contracts (\
                id, kind, property_id, \
                owner_id, advisor_id, tenant_id, cosigner_id, \
                starts_on, ends_on, duration_months, \
                canon, deposit, payment_day, \
                commission, vat, \
                status, cancellation_reason, \
                expiry_alert, ipc_alert, \
                renewed_on, last_increment_on, \
                created_at, created_by, updated_at, updated_by\
            ) VALUES (\
                $1::UUID, $2::INT2, $3::UUID, \
                $4::UUID, $5::UUID, $6::UUID, $7::UUID, \
                $8::DATE, $9::DATE, $10::INT4, \
                $11::INT8, $12::INT8, $13::INT2, \
                $14::INT4, $15::INT4, \
                $16::INT2, $17::VARCHAR, \
                $18::BOOLEAN, $19::BOOLEAN, \
                $20::DATE, $21::DATE, \
                $22::TIMESTAMPTZ, $23::VARCHAR, \
                $24::TIMESTAMPTZ, $25::VARCHAR\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET kind = EXCLUDED.kind, \
                property_id = EXCLUDED.property_id, \
                owner_id = EXCLUDED.owner_id, \
                advisor_id = EXCLUDED.advisor_id, \
                tenant_id = EXCLUDED.tenant_id, \
                cosigner_id = EXCLUDED.cosigner_id, \
                starts_on = EXCLUDED.starts_on, \
                ends_on = EXCLUDED.ends_on, \
                duration_months = EXCLUDED.duration_months, \
                canon = EXCLUDED.canon, \
                deposit = EXCLUDED.deposit, \
                payment_day = EXCLUDED.payment_day, \
                commission = EXCLUDED.commission, \
                vat = EXCLUDED.vat, \
                status = EXCLUDED.status, \
                cancellation_reason = EXCLUDED.cancellation_reason, \
                expiry_alert = EXCLUDED.expiry_alert, \
                ipc_alert = EXCLUDED.ipc_alert, \
                renewed_on = EXCLUDED.renewed_on, \
                last_increment_on = EXCLUDED.last_increment_on, \
                created_at = EXCLUDED.created_at, \
                created_by = EXCLUDED.created_by, \
                updated_at = EXCLUDED.updated_at, \
                updated_by = EXCLUDED.updated_by";
        self.exec(
            SQL,
            &[
                &id,
                &kind,
                &property_id,
                &owner_id,
                &advisor_id,
                &tenant_id,
                &cosigner_id,
                &starts_on,
                &ends_on,
                &duration_months,
                &canon,
                &deposit,
                &payment_day,
                &commission,
                &vat,
                &status,
                &cancellation_reason,
                &expiry_alert,
                &ipc_alert,
                &renewed_on,
                &last_increment_on,
                &created_at,
                &created_by,
                &updated_at,
                &updated_by,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<Active<Mandate>>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Contract>, contract::Id>>,
        Ok = Option<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Active<Mandate>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Mandate>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE kind = $1::INT2 \
              AND property_id = $2::UUID \
              AND status = $3::INT2 \
            LIMIT 1";
        let Some(row) = self
            .query_opt(
                SQL,
                &[
                    &contract::Kind::Mandate,
                    &property_id,
                    &mandate::Status::Active,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get("id"))))
            .await
            .map_err(tracerr::wrap!())
            .map(|c| {
                c.map(|c| match c {
                    Contract::Mandate(c) => Active(c),
                    Contract::Lease(_) => unreachable!("already checked"),
                })
            })
    }
}

impl<C> Database<Select<By<Option<Active<Lease>>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Contract>, contract::Id>>,
        Ok = Option<Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Active<Lease>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Lease>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE kind = $1::INT2 \
              AND property_id = $2::UUID \
              AND status = $3::INT2 \
            LIMIT 1";
        let Some(row) = self
            .query_opt(
                SQL,
                &[
                    &contract::Kind::Lease,
                    &property_id,
                    &lease::Status::Active,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get("id"))))
            .await
            .map_err(tracerr::wrap!())
            .map(|c| {
                c.map(|c| match c {
                    Contract::Lease(c) => Active(c),
                    Contract::Mandate(_) => unreachable!("already checked"),
                })
            })
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: contract::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO contracts_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Contract>, contract::EndDate>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<contract::Id, Contract>, Vec<contract::Id>>>,
        Ok = HashMap<contract::Id, Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, contract::EndDate>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let ends_on: contract::EndDate = by.into_inner();

        // `Active` shares the same discriminant in both status enums.
        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE ends_on = $1::DATE \
              AND status = $2::INT2";
        let ids = self
            .query(SQL, &[&ends_on, &mandate::Status::Active])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        self.execute(Select(By::<HashMap<contract::Id, Contract>, _>::new(
            ids,
        )))
        .await
        .map_err(tracerr::wrap!())
        .map(|c| c.into_values().collect())
    }
}

impl<C> Database<Select<By<Vec<Lease>, read::contract::AnniversaryOn>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<contract::Id, Contract>, Vec<contract::Id>>>,
        Ok = HashMap<contract::Id, Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Lease>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Lease>, read::contract::AnniversaryOn>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::AnniversaryOn { month_day, beyond } =
            by.into_inner();

        let month = i32::from(month_day.month);
        let day = i32::from(month_day.day);

        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE kind = $1::INT2 \
              AND status = $2::INT2 \
              AND EXTRACT(MONTH FROM starts_on)::INT4 = $3::INT4 \
              AND EXTRACT(DAY FROM starts_on)::INT4 = $4::INT4 \
              AND ends_on > $5::DATE";
        let ids = self
            .query(
                SQL,
                &[
                    &contract::Kind::Lease,
                    &lease::Status::Active,
                    &month,
                    &day,
                    &beyond,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        self.execute(Select(By::<HashMap<contract::Id, Contract>, _>::new(
            ids,
        )))
        .await
        .map_err(tracerr::wrap!())
        .map(|c| {
            c.into_values()
                .map(|c| match c {
                    Contract::Lease(c) => c,
                    Contract::Mandate(_) => unreachable!("already checked"),
                })
                .collect()
        })
    }
}

impl<C>
    Database<
        Select<
            By<Vec<read::contract::Expiring>, read::contract::ExpiringWithin>,
        >,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<By<HashMap<contract::Id, Contract>, Vec<contract::Id>>>,
            Ok = HashMap<contract::Id, Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<ipc::Record>, ipc::Latest>>,
            Ok = Option<ipc::Record>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<read::contract::Expiring>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::contract::Expiring>, read::contract::ExpiringWithin>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::ExpiringWithin { from, until } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE kind = $1::INT2 \
              AND status = $2::INT2 \
              AND ends_on >= $3::DATE \
              AND ends_on <= $4::DATE";
        let ids = self
            .query(
                SQL,
                &[
                    &contract::Kind::Lease,
                    &lease::Status::Active,
                    &from,
                    &until,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        let percent = self
            .execute(Select(By::<Option<ipc::Record>, _>::new(ipc::Latest)))
            .await
            .map_err(tracerr::wrap!())?
            .map_or(Percent::ZERO, |record| record.value);

        self.execute(Select(By::<HashMap<contract::Id, Contract>, _>::new(
            ids,
        )))
        .await
        .map_err(tracerr::wrap!())
        .map(|c| {
            let mut leases = c
                .into_values()
                .map(|c| match c {
                    Contract::Lease(c) => c,
                    Contract::Mandate(_) => unreachable!("already checked"),
                })
                .collect::<Vec<_>>();
            leases.sort_unstable_by_key(|l| l.ends_on);
            leases
                .into_iter()
                .map(|lease| {
                    let projected_canon =
                        lease.canon + lease.canon.percent_of(percent);
                    read::contract::Expiring {
                        lease,
                        projected_canon,
                    }
                })
                .collect()
        })
    }
}

impl<C> Database<Select<By<Vec<Lease>, person::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<contract::Id, Contract>, Vec<contract::Id>>>,
        Ok = HashMap<contract::Id, Contract>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Lease>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Lease>, person::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let advisor_id: person::Id = by.into_inner();

        const SQL: &str = "\
            SELECT l.id \
            FROM contracts AS l \
            JOIN contracts AS m \
              ON m.property_id = l.property_id \
             AND m.kind = $1::INT2 \
             AND m.status = $2::INT2 \
            WHERE l.kind = $3::INT2 \
              AND l.status = $4::INT2 \
              AND m.advisor_id = $5::UUID";
        let ids = self
            .query(
                SQL,
                &[
                    &contract::Kind::Mandate,
                    &mandate::Status::Active,
                    &contract::Kind::Lease,
                    &lease::Status::Active,
                    &advisor_id,
                ],
            )
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| {
                rows.into_iter()
                    .map(|row| row.get("id"))
                    .collect::<Vec<_>>()
            })?;

        self.execute(Select(By::<HashMap<contract::Id, Contract>, _>::new(
            ids,
        )))
        .await
        .map_err(tracerr::wrap!())
        .map(|c| {
            c.into_values()
                .map(|c| match c {
                    Contract::Lease(c) => c,
                    Contract::Mandate(_) => unreachable!("already checked"),
                })
                .collect()
        })
    }
}

impl<C>
    Database<
        Select<By<read::contract::list::Page, read::contract::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::contract::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::contract::list::Page, read::contract::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::list::Selector {
            arguments,
            filter: read::contract::list::Filter { kind },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });

        let sql = format!(
            "SELECT id, kind \
             FROM contracts \
             WHERE true \
                   {cursor} \
                   {kind_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            kind_filtering = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND kind = ${idx}::INT2"))
            }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                let kind = row.get("kind");
                (id, (id, kind))
            })
            .collect::<Vec<_>>();

        Ok(read::contract::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::contract::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::contract::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::contract::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM contracts";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
