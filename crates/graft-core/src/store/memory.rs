//! In-memory reference store.
//!
//! A plain row table, good enough for tests and for callers whose "store" is
//! process-local state. `bulk_fetch` is a scan; there is no indexing and no
//! commit surface (there is nothing to commit).

use crate::store::{RecordId, Store, StoreError};
use crate::value::{KeyValue, Value};
use derive_more::{Deref, DerefMut};
use std::collections::{BTreeMap, BTreeSet};

///
/// Row
///

#[derive(Clone, Debug, Default)]
struct Row {
    entity: String,
    fields: BTreeMap<String, Value>,
    to_one: BTreeMap<String, RecordId>,
    to_many: BTreeMap<String, Vec<RecordId>>,
}

///
/// RowTable
///

#[derive(Debug, Default, Deref, DerefMut)]
struct RowTable(BTreeMap<RecordId, Row>);

///
/// MemoryStore
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RowTable,
    next_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, id: RecordId) -> Result<&Row, StoreError> {
        self.rows.get(&id).ok_or(StoreError::UnknownRecord(id))
    }

    fn row_mut(&mut self, id: RecordId) -> Result<&mut Row, StoreError> {
        self.rows.get_mut(&id).ok_or(StoreError::UnknownRecord(id))
    }

    ///
    /// INSPECTION
    ///

    /// Number of records of the given entity type.
    #[must_use]
    pub fn count(&self, entity: &str) -> usize {
        self.rows.values().filter(|row| row.entity == entity).count()
    }

    /// Identifiers of all records of the given entity type, in id order.
    #[must_use]
    pub fn ids_of(&self, entity: &str) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|(_, row)| row.entity == entity)
            .map(|(id, _)| *id)
            .collect()
    }

    /// First record of `entity` whose `field` equals `key`, in id order.
    #[must_use]
    pub fn find_first_by(&self, entity: &str, field: &str, key: &KeyValue) -> Option<RecordId> {
        self.rows
            .iter()
            .find(|(_, row)| {
                row.entity == entity
                    && row
                        .fields
                        .get(field)
                        .and_then(Value::as_key)
                        .is_some_and(|k| &k == key)
            })
            .map(|(id, _)| *id)
    }

    /// Current target of a to-one relation.
    #[must_use]
    pub fn to_one(&self, id: RecordId, relation: &str) -> Option<RecordId> {
        self.rows.get(&id)?.to_one.get(relation).copied()
    }

    /// Current members of a to-many relation, in insertion order.
    #[must_use]
    pub fn to_many(&self, id: RecordId, relation: &str) -> Vec<RecordId> {
        self.rows
            .get(&id)
            .and_then(|row| row.to_many.get(relation))
            .cloned()
            .unwrap_or_default()
    }
}

impl Store for MemoryStore {
    fn insert_new(&mut self, entity: &str) -> Result<RecordId, StoreError> {
        self.next_id += 1;
        let id = RecordId::new(self.next_id);
        self.rows.insert(
            id,
            Row {
                entity: entity.to_string(),
                ..Row::default()
            },
        );

        Ok(id)
    }

    fn bulk_fetch(
        &mut self,
        entity: &str,
        field: &str,
        keys: &BTreeSet<KeyValue>,
    ) -> Result<Vec<RecordId>, StoreError> {
        let ids = self
            .rows
            .iter()
            .filter(|(_, row)| {
                row.entity == entity
                    && row
                        .fields
                        .get(field)
                        .and_then(Value::as_key)
                        .is_some_and(|key| keys.contains(&key))
            })
            .map(|(id, _)| *id)
            .collect();

        Ok(ids)
    }

    fn get(&self, id: RecordId, field: &str) -> Option<Value> {
        self.row(id).ok()?.fields.get(field).cloned()
    }

    fn set(&mut self, id: RecordId, field: &str, value: Value) -> Result<(), StoreError> {
        self.row_mut(id)?.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn set_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.row(target)?;
        self.row_mut(id)?.to_one.insert(relation.to_string(), target);
        Ok(())
    }

    fn add_to_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError> {
        self.row(target)?;
        let members = self.row_mut(id)?.to_many.entry(relation.to_string()).or_default();
        if !members.contains(&target) {
            members.push(target);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_set_get_roundtrip() {
        let mut store = MemoryStore::new();
        let id = store.insert_new("Person").unwrap();

        store.set(id, "name", Value::Text("A".to_string())).unwrap();
        assert_eq!(store.get(id, "name"), Some(Value::Text("A".to_string())));
        assert_eq!(store.get(id, "age"), None);
        assert_eq!(store.count("Person"), 1);
        assert_eq!(store.count("Company"), 0);
    }

    #[test]
    fn writes_to_missing_records_fail() {
        let mut store = MemoryStore::new();
        let ghost = RecordId::new(99);

        assert_eq!(
            store.set(ghost, "name", Value::Null),
            Err(StoreError::UnknownRecord(ghost))
        );
        assert_eq!(store.get(ghost, "name"), None);
    }

    #[test]
    fn bulk_fetch_filters_by_entity_and_key() {
        let mut store = MemoryStore::new();
        let a = store.insert_new("Person").unwrap();
        let b = store.insert_new("Person").unwrap();
        let c = store.insert_new("Company").unwrap();
        store.set(a, "id", Value::Uint(1)).unwrap();
        store.set(b, "id", Value::Uint(2)).unwrap();
        store.set(c, "id", Value::Uint(1)).unwrap();

        let keys: BTreeSet<KeyValue> = [KeyValue::Uint(1), KeyValue::Uint(3)].into();
        let found = store.bulk_fetch("Person", "id", &keys).unwrap();

        assert_eq!(found, vec![a]);
    }

    #[test]
    fn relation_wiring() {
        let mut store = MemoryStore::new();
        let company = store.insert_new("Company").unwrap();
        let x = store.insert_new("Person").unwrap();
        let y = store.insert_new("Person").unwrap();

        store.set_relation(x, "company", company).unwrap();
        assert_eq!(store.to_one(x, "company"), Some(company));

        store.add_to_relation(company, "employees", x).unwrap();
        store.add_to_relation(company, "employees", y).unwrap();
        store.add_to_relation(company, "employees", x).unwrap();
        assert_eq!(store.to_many(company, "employees"), vec![x, y]);

        // linking to a missing target is refused
        let ghost = RecordId::new(42);
        assert_eq!(
            store.set_relation(x, "company", ghost),
            Err(StoreError::UnknownRecord(ghost))
        );
    }

    #[test]
    fn find_first_by_key() {
        let mut store = MemoryStore::new();
        let a = store.insert_new("Person").unwrap();
        store.set(a, "id", Value::Uint(7)).unwrap();

        assert_eq!(
            store.find_first_by("Person", "id", &KeyValue::Uint(7)),
            Some(a)
        );
        assert_eq!(store.find_first_by("Person", "id", &KeyValue::Uint(8)), None);
        assert_eq!(
            store.find_first_by("Company", "id", &KeyValue::Uint(7)),
            None
        );
    }
}
