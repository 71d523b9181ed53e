//! Shared fixtures for command and task tests.

use std::time::Duration;

use common::{Date, DateTime, Money, Percent};

use crate::{
    domain::{
        contract::{self, lease, mandate, Lease, Mandate},
        ipc, person, property, Property,
    },
    infra::database::in_memory::InMemory,
    task, Config, Service,
};

pub(crate) fn date(year: i32, month: u8, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}

pub(crate) fn money(amount: i64) -> Money {
    Money::new(amount).unwrap()
}

pub(crate) fn percent(s: &str) -> Percent {
    s.parse().unwrap()
}

pub(crate) fn actor() -> person::Actor {
    person::Actor::new("tester").unwrap()
}

pub(crate) fn service(database: InMemory) -> Service<InMemory> {
    Service {
        config: Config {
            expiry_alerts: task::expiry_alerts::Config {
                interval: Duration::from_secs(3600),
                actor: actor(),
            },
        },
        database,
    }
}

pub(crate) fn property() -> Property {
    Property {
        id: property::Id::new(),
        address: "Calle 100 #15-20, Bogota".parse().unwrap(),
        availability: property::Availability::Available,
        estimated_canon: money(1_000_000),
        administration_fee: money(150_000),
        created_at: DateTime::now().coerce(),
        updated_at: DateTime::now().coerce(),
    }
}

pub(crate) fn mandate(property_id: property::Id) -> Mandate {
    Mandate {
        id: contract::Id::new(),
        property_id,
        owner_id: person::Id::new(),
        advisor_id: person::Id::new(),
        starts_on: date(2024, 1, 15).coerce(),
        ends_on: date(2025, 1, 15).coerce(),
        duration: contract::DurationMonths::new(12).unwrap(),
        canon: money(1_000_000),
        commission: mandate::FeeRate::new(800).unwrap(),
        vat: mandate::FeeRate::DEFAULT_VAT,
        status: mandate::Status::Active,
        cancellation_reason: None,
        expiry_alert: true,
        renewed_on: None,
        created_at: DateTime::now().coerce(),
        created_by: actor(),
        updated_at: DateTime::now().coerce(),
        updated_by: actor(),
    }
}

pub(crate) fn lease(property_id: property::Id) -> Lease {
    Lease {
        id: contract::Id::new(),
        property_id,
        tenant_id: person::Id::new(),
        cosigner_id: None,
        starts_on: date(2024, 3, 10).coerce(),
        ends_on: date(2025, 3, 10).coerce(),
        duration: contract::DurationMonths::new(12).unwrap(),
        canon: money(1_000_000),
        deposit: money(1_000_000),
        payment_day: contract::PaymentDay::new(5).unwrap(),
        status: lease::Status::Active,
        cancellation_reason: None,
        expiry_alert: true,
        ipc_alert: true,
        renewed_on: None,
        last_increment_on: None,
        created_at: DateTime::now().coerce(),
        created_by: actor(),
        updated_at: DateTime::now().coerce(),
        updated_by: actor(),
    }
}

pub(crate) fn ipc_record(year: i32, value: &str) -> ipc::Record {
    ipc::Record {
        year: year.into(),
        value: percent(value),
        published_on: date(year, 1, 5),
        is_active: true,
    }
}
