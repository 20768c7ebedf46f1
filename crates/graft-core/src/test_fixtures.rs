//! Shared test fixtures: the Person/Company/Job schema used across the
//! import tests, a record-literal macro, and store wrappers for observing
//! and failing bulk fetches.

use crate::store::{RecordId, Store, StoreError};
use crate::value::{KeyValue, Value};
use graft_schema::node::{EntityDef, FieldDef, RelationDef};
use graft_schema::registry::SchemaRegistry;
use graft_schema::types::FieldKind;
use std::collections::{BTreeSet, HashMap};

/// Build a `Record` from `"key" => value` pairs; values go through
/// `Value::from`.
macro_rules! record {
    ( $( $key:literal => $value:expr ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut record = crate::representation::Record::new();
        $( record.insert(($key).to_string(), crate::value::Value::from($value)); )*
        record
    }};
}

pub(crate) use record;

/// Canonical fixture schema.
///
/// `Person.computer` deliberately targets an unregistered entity to exercise
/// the skip-on-configuration-error paths, so this registry does not pass
/// `validate()`.
pub(crate) fn people_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry
        .register(
            EntityDef::new("Person")
                .with_field(FieldDef::new("id", FieldKind::Uint))
                .with_field(FieldDef::new("name", FieldKind::Text).with_lookup_key("fullName"))
                .with_field(FieldDef::new("age", FieldKind::Uint))
                .with_primary_key("id")
                .with_relation(
                    RelationDef::to_one("company", "Company").with_lookup_key("companyId"),
                )
                .with_relation(RelationDef::to_one("job", "Job"))
                .with_relation(RelationDef::to_one("manager", "Person"))
                .with_relation(RelationDef::to_one("computer", "Computer")),
        )
        .expect("fixture entity registers");

    registry
        .register(
            EntityDef::new("Company")
                .with_field(FieldDef::new("id", FieldKind::Uint))
                .with_field(FieldDef::new("name", FieldKind::Text))
                .with_field(
                    FieldDef::new("founded", FieldKind::Timestamp)
                        .with_date_format("[year]-[month]-[day]"),
                )
                .with_primary_key("id")
                .with_relation(RelationDef::to_many("employees", "Person")),
        )
        .expect("fixture entity registers");

    registry
        .register(
            EntityDef::new("Job")
                .with_field(FieldDef::new("id", FieldKind::Uint))
                .with_field(FieldDef::new("title", FieldKind::Text))
                .with_primary_key("id"),
        )
        .expect("fixture entity registers");

    // no primary key: records of this type are always created fresh
    registry
        .register(EntityDef::new("Note").with_field(FieldDef::new("body", FieldKind::Text)))
        .expect("fixture entity registers");

    registry
}

///
/// CountingStore
///
/// Wrapper counting bulk fetches per entity type.
///

pub(crate) struct CountingStore<S: Store> {
    pub(crate) inner: S,
    fetches: HashMap<String, usize>,
}

impl<S: Store> CountingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: HashMap::new(),
        }
    }

    pub(crate) fn fetches(&self, entity: &str) -> usize {
        self.fetches.get(entity).copied().unwrap_or_default()
    }
}

impl<S: Store> Store for CountingStore<S> {
    fn insert_new(&mut self, entity: &str) -> Result<RecordId, StoreError> {
        self.inner.insert_new(entity)
    }

    fn bulk_fetch(
        &mut self,
        entity: &str,
        field: &str,
        keys: &BTreeSet<KeyValue>,
    ) -> Result<Vec<RecordId>, StoreError> {
        *self.fetches.entry(entity.to_string()).or_default() += 1;
        self.inner.bulk_fetch(entity, field, keys)
    }

    fn get(&self, id: RecordId, field: &str) -> Option<Value> {
        self.inner.get(id, field)
    }

    fn set(&mut self, id: RecordId, field: &str, value: Value) -> Result<(), StoreError> {
        self.inner.set(id, field, value)
    }

    fn set_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.inner.set_relation(id, relation, target)
    }

    fn add_to_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.inner.add_to_relation(id, relation, target)
    }
}

///
/// FailingStore
///
/// Wrapper whose bulk fetch always fails; everything else delegates.
///

pub(crate) struct FailingStore<S: Store> {
    pub(crate) inner: S,
}

impl<S: Store> FailingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Store> Store for FailingStore<S> {
    fn insert_new(&mut self, entity: &str) -> Result<RecordId, StoreError> {
        self.inner.insert_new(entity)
    }

    fn bulk_fetch(
        &mut self,
        _entity: &str,
        _field: &str,
        _keys: &BTreeSet<KeyValue>,
    ) -> Result<Vec<RecordId>, StoreError> {
        Err(StoreError::Backend {
            message: "fetch refused".to_string(),
        })
    }

    fn get(&self, id: RecordId, field: &str) -> Option<Value> {
        self.inner.get(id, field)
    }

    fn set(&mut self, id: RecordId, field: &str, value: Value) -> Result<(), StoreError> {
        self.inner.set(id, field, value)
    }

    fn set_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.inner.set_relation(id, relation, target)
    }

    fn add_to_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.inner.add_to_relation(id, relation, target)
    }
}
