//! Two-phase identity cache.
//!
//! Phase one (`prefetch`) scans the payload and collects every primary-key
//! value mentioned per entity type, without touching the store. Phase two
//! (`resolve`, lazy) issues exactly one key-membership fetch per type and
//! memoizes the result. Keys discovered after a type has resolved are not
//! re-fetched: they are handled by create-on-miss, and every create inserts
//! into the resolved table immediately, so one key never yields two records
//! within a session.

use crate::MAX_NEST_DEPTH;
use crate::mapping::Mapping;
use crate::representation::{Record, Representation};
use crate::store::{RecordId, Store};
use crate::value::{KeyValue, Value};
use std::collections::{BTreeSet, HashMap, hash_map::Entry};
use tracing::warn;

///
/// IdentityCache
///
/// Session-scoped; one instance per import, discarded afterwards. Reusing an
/// instance across sessions would serve stale resolved tables.
///

#[derive(Debug, Default)]
pub struct IdentityCache {
    /// Keys seen in the payload but not yet confirmed against the store.
    pending: HashMap<String, BTreeSet<KeyValue>>,
    /// Per-type key → record tables, populated by one fetch each.
    resolved: HashMap<String, HashMap<KeyValue, RecordId>>,
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect primary-key values for every record reachable from the
    /// representation under `mapping`, recursing through nested relation
    /// values. Issues no store queries.
    pub fn prefetch(&mut self, representation: &Representation, mapping: &Mapping<'_>) {
        for record in representation.records() {
            self.scan_record(record, mapping, 0);
        }
    }

    fn scan_record(&mut self, record: &Record, mapping: &Mapping<'_>, depth: usize) {
        if depth > MAX_NEST_DEPTH {
            warn!(
                entity = %mapping.entity_name(),
                "max nesting depth exceeded during prefetch, deeper records ignored"
            );
            return;
        }

        if let Some(key) = mapping.primary_key_value(record) {
            self.pending
                .entry(mapping.entity_name().to_string())
                .or_default()
                .insert(key);
        }

        for relation in mapping.relations() {
            // unresolvable destinations are reported during the build phase
            let Some(dest) = mapping.relation_mapping(relation) else {
                continue;
            };
            let Some(value) = mapping.value_for_relation(record, relation) else {
                continue;
            };

            match value {
                Value::Record(nested) => self.scan_record(nested, &dest, depth + 1),
                Value::List(items) => {
                    for item in items {
                        if let Value::Record(nested) = item {
                            self.scan_record(nested, &dest, depth + 1);
                        }
                    }
                }
                scalar => {
                    // foreign-key-only relation value
                    if let Some(key) = scalar.as_key() {
                        self.pending
                            .entry(dest.entity_name().to_string())
                            .or_default()
                            .insert(key);
                    }
                }
            }
        }
    }

    /// The resolved table for `mapping`'s type, fetching it on first use.
    ///
    /// The one fetch covers the type's pending key set; afterwards the table
    /// is served as-is for the rest of the session, even when the pending
    /// set has since grown. A failed fetch degrades to an empty table.
    pub fn resolve<S: Store>(
        &mut self,
        mapping: &Mapping<'_>,
        store: &mut S,
    ) -> &HashMap<KeyValue, RecordId> {
        match self.resolved.entry(mapping.entity_name().to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(fetch_existing(&self.pending, mapping, store)),
        }
    }

    /// Look up the persisted record matching the record's primary key.
    pub fn find<S: Store>(
        &mut self,
        record: &Record,
        mapping: &Mapping<'_>,
        store: &mut S,
    ) -> Option<RecordId> {
        let key = mapping.primary_key_value(record)?;
        self.resolve(mapping, store).get(&key).copied()
    }

    /// Look up by an explicit key value (foreign-key-only relations).
    pub fn find_by_key<S: Store>(
        &mut self,
        key: &KeyValue,
        mapping: &Mapping<'_>,
        store: &mut S,
    ) -> Option<RecordId> {
        self.resolve(mapping, store).get(key).copied()
    }

    /// Add a newly created record to its type's resolved table.
    ///
    /// A record with no primary-key value is not cacheable (it can never be
    /// matched again), and a type that has not resolved yet is left alone.
    /// The import path always resolves (through `find`/`find_by_key`) before
    /// creating, so nothing is lost.
    pub fn insert<S: Store>(&mut self, id: RecordId, mapping: &Mapping<'_>, store: &S) {
        let Some(key) = mapping.primary_key_of(store, id) else {
            return;
        };
        if let Some(table) = self.resolved.get_mut(mapping.entity_name()) {
            table.insert(key, id);
        }
    }
}

fn fetch_existing<S: Store>(
    pending: &HashMap<String, BTreeSet<KeyValue>>,
    mapping: &Mapping<'_>,
    store: &mut S,
) -> HashMap<KeyValue, RecordId> {
    let entity = mapping.entity_name();

    let Some(field) = mapping.primary_key_field() else {
        return HashMap::new();
    };
    let Some(keys) = pending.get(entity).filter(|keys| !keys.is_empty()) else {
        return HashMap::new();
    };

    match store.bulk_fetch(entity, &field.name, keys) {
        Ok(ids) => ids
            .into_iter()
            .filter_map(|id| mapping.primary_key_of(store, id).map(|key| (key, id)))
            .collect(),
        Err(err) => {
            warn!(
                entity = %entity,
                error = %err,
                "bulk fetch failed, treating all records of this type as new"
            );
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_fixtures::{CountingStore, FailingStore, people_registry, record};

    fn pending_of(cache: &IdentityCache, entity: &str) -> BTreeSet<KeyValue> {
        cache.pending.get(entity).cloned().unwrap_or_default()
    }

    #[test]
    fn prefetch_collects_keys_without_touching_the_store() {
        let registry = people_registry();
        let mapping = Mapping::new(&registry, "Company").unwrap();
        let mut cache = IdentityCache::new();

        let rep = Representation::from(record! {
            "id" => 5u64,
            "employees" => vec![
                record! { "id" => 1u64, "job" => record! { "id" => 40u64 } },
                record! { "id" => 2u64, "companyId" => 6u64 },
            ],
        });
        cache.prefetch(&rep, &mapping);

        assert_eq!(
            pending_of(&cache, "Company"),
            [KeyValue::Uint(5), KeyValue::Uint(6)].into()
        );
        assert_eq!(
            pending_of(&cache, "Person"),
            [KeyValue::Uint(1), KeyValue::Uint(2)].into()
        );
        // nested-record relation two levels down
        assert_eq!(pending_of(&cache, "Job"), [KeyValue::Uint(40)].into());
        assert!(cache.resolved.is_empty());
    }

    #[test]
    fn resolve_fetches_once_per_type() {
        let registry = people_registry();
        let mapping = Mapping::new(&registry, "Person").unwrap();

        let mut inner = MemoryStore::new();
        let existing = inner.insert_new("Person").unwrap();
        inner.set(existing, "id", Value::Uint(1)).unwrap();
        let mut store = CountingStore::new(inner);

        let mut cache = IdentityCache::new();
        let rep = Representation::from(vec![record! { "id" => 1u64 }, record! { "id" => 2u64 }]);
        cache.prefetch(&rep, &mapping);

        let found = cache.find(&record! { "id" => 1u64 }, &mapping, &mut store);
        assert_eq!(found, Some(existing));
        assert_eq!(cache.find(&record! { "id" => 2u64 }, &mapping, &mut store), None);
        assert_eq!(
            cache.find_by_key(&KeyValue::Uint(1), &mapping, &mut store),
            Some(existing)
        );

        assert_eq!(store.fetches("Person"), 1);
    }

    #[test]
    fn types_without_pending_keys_memoize_empty() {
        let registry = people_registry();
        let mapping = Mapping::new(&registry, "Job").unwrap();
        let mut store = CountingStore::new(MemoryStore::new());
        let mut cache = IdentityCache::new();

        assert_eq!(
            cache.find_by_key(&KeyValue::Uint(40), &mapping, &mut store),
            None
        );
        assert_eq!(
            cache.find_by_key(&KeyValue::Uint(41), &mapping, &mut store),
            None
        );
        // nothing pending: the store was never asked
        assert_eq!(store.fetches("Job"), 0);
    }

    #[test]
    fn insert_populates_the_resolved_table() {
        let registry = people_registry();
        let mapping = Mapping::new(&registry, "Person").unwrap();
        let mut store = MemoryStore::new();
        let mut cache = IdentityCache::new();

        let record = record! { "id" => 3u64 };
        cache.prefetch(&Representation::from(record.clone()), &mapping);

        // miss resolves the type, then the created record becomes findable
        assert_eq!(cache.find(&record, &mapping, &mut store), None);
        let id = mapping.create_record(&mut store, &record).unwrap();
        cache.insert(id, &mapping, &store);

        assert_eq!(cache.find(&record, &mapping, &mut store), Some(id));
    }

    #[test]
    fn failed_fetch_degrades_to_nothing_found() {
        let registry = people_registry();
        let mapping = Mapping::new(&registry, "Person").unwrap();
        let mut store = FailingStore::new(MemoryStore::new());
        let mut cache = IdentityCache::new();

        let record = record! { "id" => 1u64 };
        cache.prefetch(&Representation::from(record.clone()), &mapping);

        assert_eq!(cache.find(&record, &mapping, &mut store), None);
    }
}
