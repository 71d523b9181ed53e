//! In-memory [`Database`] double for command and task tests.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use tracerr::Traced;

use crate::{
    domain::{
        alert::{self, Alert},
        contract::{self, Lease, Mandate},
        ipc, property, renewal, Contract, Property,
    },
    infra::{database, Database},
    read::{self, contract::Active},
};

/// In-memory [`Database`] double.
///
/// [`Transact`] stages a copy of the whole state, writes land on the staged
/// copy, and [`Commit`] publishes it back. Uncommitted writes are therefore
/// invisible, matching the transactional behavior commands rely upon.
#[derive(Clone, Debug)]
pub struct InMemory {
    /// Committed state.
    base: Rc<RefCell<State>>,

    /// Staged state of an open transaction, if any.
    staged: Option<Rc<RefCell<State>>>,
}

/// Inner state of an [`InMemory`] database.
#[derive(Clone, Debug, Default)]
struct State {
    properties: HashMap<property::Id, Property>,
    contracts: HashMap<contract::Id, Contract>,
    ipc_records: BTreeMap<ipc::Year, ipc::Record>,
    increments: Vec<ipc::Increment>,
    renewals: Vec<renewal::Event>,
    alerts: Vec<Alert>,
    failures: Failures,
}

/// Failure injection flags of an [`InMemory`] database.
#[derive(Clone, Copy, Debug, Default)]
struct Failures {
    update_property: bool,
    insert_increment: bool,
}

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    pub fn new() -> Self {
        Self {
            base: Rc::new(RefCell::new(State::default())),
            staged: None,
        }
    }

    /// Returns the state cell writes and reads should go through.
    fn cell(&self) -> &Rc<RefCell<State>> {
        self.staged.as_ref().unwrap_or(&self.base)
    }

    /// Seeds the provided [`Property`].
    pub fn seed_property(&self, property: Property) {
        drop(
            self.cell()
                .borrow_mut()
                .properties
                .insert(property.id, property),
        );
    }

    /// Seeds the provided [`Contract`].
    pub fn seed_contract(&self, contract: impl Into<Contract>) {
        let contract = contract.into();
        drop(
            self.cell()
                .borrow_mut()
                .contracts
                .insert(contract.id(), contract),
        );
    }

    /// Seeds the provided [`ipc::Record`].
    pub fn seed_ipc_record(&self, record: ipc::Record) {
        drop(
            self.cell()
                .borrow_mut()
                .ipc_records
                .insert(record.year, record),
        );
    }

    /// Makes every following [`Update`] of a [`Property`] fail.
    pub fn fail_property_updates(&self) {
        self.cell().borrow_mut().failures.update_property = true;
    }

    /// Makes every following [`Insert`] of an [`ipc::Increment`] fail.
    pub fn fail_increment_inserts(&self) {
        self.cell().borrow_mut().failures.insert_increment = true;
    }

    /// Returns the committed [`Property`] with the provided ID, if any.
    pub fn property(&self, id: property::Id) -> Option<Property> {
        self.base.borrow().properties.get(&id).cloned()
    }

    /// Returns the committed [`Contract`] with the provided ID, if any.
    pub fn contract(&self, id: contract::Id) -> Option<Contract> {
        self.base.borrow().contracts.get(&id).cloned()
    }

    /// Returns all the committed [`renewal::Event`]s.
    pub fn renewal_events(&self) -> Vec<renewal::Event> {
        self.base.borrow().renewals.clone()
    }

    /// Returns all the committed [`ipc::Increment`]s.
    pub fn increments(&self) -> Vec<ipc::Increment> {
        self.base.borrow().increments.clone()
    }

    /// Returns all the committed [`Alert`]s.
    pub fn alerts(&self) -> Vec<Alert> {
        self.base.borrow().alerts.clone()
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an injected [`database::Error`].
fn injected() -> Traced<database::Error> {
    tracerr::new!(database::Error::Injected)
}

impl Database<Transact> for InMemory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        if self.staged.is_some() {
            return Ok(self.clone());
        }
        let staged = Rc::new(RefCell::new(self.base.borrow().clone()));
        Ok(Self {
            base: Rc::clone(&self.base),
            staged: Some(staged),
        })
    }
}

impl Database<Commit> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        if let Some(staged) = &self.staged {
            *self.base.borrow_mut() = staged.borrow().clone();
        }
        Ok(())
    }
}

impl Database<Lock<By<Property, property::Id>>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Contract, contract::Id>>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Contract>, contract::Id>>> for InMemory {
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.cell().borrow().contracts.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Property>, property::Id>>> for InMemory {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .cell()
            .borrow()
            .properties
            .get(&by.into_inner())
            .cloned())
    }
}

impl Database<Select<By<Option<Active<Mandate>>, property::Id>>> for InMemory {
    type Ok = Option<Active<Mandate>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Mandate>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        Ok(self.cell().borrow().contracts.values().find_map(|c| {
            match c {
                Contract::Mandate(m)
                    if m.property_id == property_id && m.is_active() =>
                {
                    Some(Active(m.clone()))
                }
                Contract::Mandate(_) | Contract::Lease(_) => None,
            }
        }))
    }
}

impl Database<Select<By<Option<Active<Lease>>, property::Id>>> for InMemory {
    type Ok = Option<Active<Lease>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Lease>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        Ok(self.cell().borrow().contracts.values().find_map(|c| {
            match c {
                Contract::Lease(l)
                    if l.property_id == property_id && l.is_active() =>
                {
                    Some(Active(l.clone()))
                }
                Contract::Mandate(_) | Contract::Lease(_) => None,
            }
        }))
    }
}

impl Database<Select<By<Option<ipc::Record>, ipc::Latest>>> for InMemory {
    type Ok = Option<ipc::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ipc::Record>, ipc::Latest>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ipc::Latest = by.into_inner();
        Ok(self
            .cell()
            .borrow()
            .ipc_records
            .values()
            .rev()
            .find(|r| r.is_active)
            .copied())
    }
}

impl Database<Select<By<Option<ipc::Record>, ipc::Year>>> for InMemory {
    type Ok = Option<ipc::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ipc::Record>, ipc::Year>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .cell()
            .borrow()
            .ipc_records
            .get(&by.into_inner())
            .copied())
    }
}

impl Database<Select<By<Vec<Contract>, contract::EndDate>>> for InMemory {
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, contract::EndDate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ends_on = by.into_inner();
        Ok(self
            .cell()
            .borrow()
            .contracts
            .values()
            .filter(|c| c.is_active() && c.ends_on() == ends_on)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Lease>, read::contract::AnniversaryOn>>>
    for InMemory
{
    type Ok = Vec<Lease>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Lease>, read::contract::AnniversaryOn>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::AnniversaryOn { month_day, beyond } =
            by.into_inner();
        Ok(self
            .cell()
            .borrow()
            .contracts
            .values()
            .filter_map(|c| match c {
                Contract::Lease(l)
                    if l.is_active()
                        && l.starts_on.month_day() == month_day
                        && l.ends_on.coerce::<()>() > beyond =>
                {
                    Some(l.clone())
                }
                Contract::Mandate(_) | Contract::Lease(_) => None,
            })
            .collect())
    }
}

impl Database<Select<By<Option<Alert>, alert::Lookup>>> for InMemory {
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
        Ok(self
            .cell()
            .borrow()
            .alerts
            .iter()
            .find(|a| {
                a.kind == kind
                    && a.contract_kind == contract_kind
                    && a.contract_id == contract_id
                    && a.status == alert::Status::Pending
                    && a.created_at.date() == created_on
            })
            .cloned())
    }
}

impl Database<Insert<Contract>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed_contract(contract);
        Ok(())
    }
}

impl Database<Update<Contract>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed_contract(contract);
        Ok(())
    }
}

impl Database<Update<Property>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.cell().borrow().failures.update_property {
            return Err(injected());
        }
        self.seed_property(property);
        Ok(())
    }
}

impl Database<Insert<ipc::Record>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<ipc::Record>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed_ipc_record(record);
        Ok(())
    }
}

impl Database<Insert<ipc::Increment>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(increment): Insert<ipc::Increment>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.cell().borrow().failures.insert_increment {
            return Err(injected());
        }
        self.cell().borrow_mut().increments.push(increment);
        Ok(())
    }
}

impl Database<Insert<renewal::Event>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(event): Insert<renewal::Event>,
    ) -> Result<Self::Ok, Self::Err> {
        self.cell().borrow_mut().renewals.push(event);
        Ok(())
    }
}

impl Database<Insert<Alert>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(alert): Insert<Alert>,
    ) -> Result<Self::Ok, Self::Err> {
        self.cell().borrow_mut().alerts.push(alert);
        Ok(())
    }
}
