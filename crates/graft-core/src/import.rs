//! Import session orchestration.
//!
//! Two phases over one normalized payload: the attribute phase finds or
//! creates a persisted record per payload record and merges its fields; the
//! relationship phase wires links, recursing into nested records (which are
//! imported on the way). Attributes must exist before relationships because
//! relationship building looks records up by identity.
//!
//! Single-threaded and synchronous throughout; the only store round trips
//! are the cache's one bulk fetch per entity type and the individual
//! insert/write calls. Commit policy stays with the caller.

use crate::MAX_NEST_DEPTH;
use crate::cache::IdentityCache;
use crate::error::ImportError;
use crate::hooks::{ImportHooks, NoHooks};
use crate::mapping::Mapping;
use crate::representation::{Record, Representation};
use crate::store::{RecordId, Store};
use crate::value::Value;
use graft_schema::node::RelationDef;
use graft_schema::registry::SchemaRegistry;
use tracing::{debug, warn};

///
/// ImportStats
///
/// Counter snapshot for one session.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImportStats {
    pub records_created: usize,
    pub fields_written: usize,
    pub relations_linked: usize,
    pub records_skipped: usize,
    pub relations_skipped: usize,
}

///
/// ImportSession
///
/// One payload, one root entity type, one store, one identity cache. The
/// cache is built (pending keys only) at construction; sessions are not
/// reusable across payloads.
///

pub struct ImportSession<'a, S: Store> {
    representation: Representation,
    root: Mapping<'a>,
    engine: Engine<'a, S>,
}

impl<'a, S: Store> ImportSession<'a, S> {
    pub fn new(
        representation: Representation,
        entity: &str,
        registry: &'a SchemaRegistry,
        store: &'a mut S,
    ) -> Result<Self, ImportError> {
        let root = Mapping::new(registry, entity)
            .ok_or_else(|| ImportError::UnknownEntity(entity.to_string()))?;

        let mut cache = IdentityCache::new();
        cache.prefetch(&representation, &root);

        Ok(Self {
            representation,
            root,
            engine: Engine {
                store,
                cache,
                hooks: &NoHooks,
                stats: ImportStats::default(),
            },
        })
    }

    /// Attach lifecycle hooks. Defaults to `NoHooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a dyn ImportHooks) -> Self {
        self.engine.hooks = hooks;
        self
    }

    #[must_use]
    pub const fn stats(&self) -> ImportStats {
        self.engine.stats
    }

    /// Import attributes, then build relationships.
    pub fn import_representation(&mut self) -> Result<(), ImportError> {
        self.import_attributes()?;
        self.build_relationships()
    }

    /// Find-or-create and field-merge every top-level record. Does not touch
    /// relationships.
    pub fn import_attributes(&mut self) -> Result<(), ImportError> {
        for record in self.representation.records() {
            self.engine.import_attributes_for(record, &self.root)?;
        }

        Ok(())
    }

    /// Build relationships for every top-level record.
    ///
    /// Precondition: `import_attributes` has run for the same (or a
    /// superset) payload; records it never saw are skipped here.
    pub fn build_relationships(&mut self) -> Result<(), ImportError> {
        for record in self.representation.records() {
            self.engine.build_relationships_for(record, &self.root, 0)?;
        }

        Ok(())
    }
}

/// One-call convenience: build a session, run both phases, return the stats.
pub fn import_representation<S: Store>(
    representation: Representation,
    entity: &str,
    registry: &SchemaRegistry,
    store: &mut S,
) -> Result<ImportStats, ImportError> {
    let mut session = ImportSession::new(representation, entity, registry, store)?;
    session.import_representation()?;

    Ok(session.stats())
}

///
/// Engine
///
/// Mutable half of the session, split off so record borrows from the
/// representation can outlive engine mutations.
///

struct Engine<'a, S: Store> {
    store: &'a mut S,
    cache: IdentityCache,
    hooks: &'a dyn ImportHooks,
    stats: ImportStats,
}

impl<S: Store> Engine<'_, S> {
    /// Find-or-create the record's persisted counterpart, then merge fields
    /// unless the record-level hook vetoes. A vetoed record stays created
    /// and cached so relations can still link to it.
    fn import_attributes_for(
        &mut self,
        record: &Record,
        mapping: &Mapping<'_>,
    ) -> Result<(), ImportError> {
        let id = match self.cache.find(record, mapping, self.store) {
            Some(id) => id,
            None => {
                let id = mapping.create_record(self.store, record)?;
                self.cache.insert(id, mapping, self.store);
                self.stats.records_created += 1;
                id
            }
        };

        if !self.hooks.should_import(mapping.entity_name(), id, record) {
            self.stats.records_skipped += 1;
            return Ok(());
        }

        self.hooks.will_import(mapping.entity_name(), id, record);
        let writes = mapping.update_fields(self.store, id, record, self.hooks)?;
        self.stats.fields_written += writes;

        Ok(())
    }

    fn build_relationships_for(
        &mut self,
        record: &Record,
        mapping: &Mapping<'_>,
        depth: usize,
    ) -> Result<(), ImportError> {
        if depth > MAX_NEST_DEPTH {
            warn!(
                entity = %mapping.entity_name(),
                "max nesting depth exceeded, deeper relationships skipped"
            );
            return Ok(());
        }

        // attributes must have been imported first
        let Some(id) = self.cache.find(record, mapping, self.store) else {
            debug!(
                entity = %mapping.entity_name(),
                "record was never imported, relationships skipped"
            );
            return Ok(());
        };

        for relation in mapping.relations() {
            let Some(dest) = mapping.relation_mapping(relation) else {
                warn!(
                    entity = %mapping.entity_name(),
                    relation = %relation.name,
                    destination = %relation.destination,
                    "relation destination is not registered, skipped"
                );
                self.stats.relations_skipped += 1;
                continue;
            };
            // no value supplied: leave any existing link untouched
            let Some(value) = mapping.value_for_relation(record, relation) else {
                continue;
            };
            if !self
                .hooks
                .should_build_relation(mapping.entity_name(), &relation.name, value, record)
            {
                self.stats.relations_skipped += 1;
                continue;
            }

            match value {
                // nested records: import each, then link
                Value::List(items) => {
                    if !relation.cardinality.is_many() {
                        warn!(
                            entity = %mapping.entity_name(),
                            relation = %relation.name,
                            "array value supplied for a to-one relation"
                        );
                    }
                    for item in items {
                        let Value::Record(nested) = item else {
                            debug!(
                                entity = %mapping.entity_name(),
                                relation = %relation.name,
                                "non-record element in relation array, skipped"
                            );
                            continue;
                        };
                        self.import_nested(nested, &dest, depth)?;
                        if let Some(target) = self.cache.find(nested, &dest, self.store) {
                            self.link(id, relation, target)?;
                        }
                    }
                }
                Value::Record(nested) => {
                    self.import_nested(nested, &dest, depth)?;
                    if let Some(target) = self.cache.find(nested, &dest, self.store) {
                        self.link(id, relation, target)?;
                    }
                }
                Value::Null => {}
                scalar => {
                    // foreign-key-only: resolve by key, creating a stub
                    // record that carries just the key on a miss
                    let Some(key) = scalar.as_key() else {
                        debug!(
                            entity = %mapping.entity_name(),
                            relation = %relation.name,
                            "relation value is not usable as a key, skipped"
                        );
                        self.stats.relations_skipped += 1;
                        continue;
                    };

                    let target = match self.cache.find_by_key(&key, &dest, self.store) {
                        Some(target) => target,
                        None => {
                            let target = dest.create_with_key(self.store, &key)?;
                            self.cache.insert(target, &dest, self.store);
                            self.stats.records_created += 1;
                            target
                        }
                    };
                    self.link(id, relation, target)?;
                }
            }
        }

        self.hooks.did_import(mapping.entity_name(), id, record);

        Ok(())
    }

    /// Recursively import a nested relation record: attributes first, then
    /// its own relationships.
    fn import_nested(
        &mut self,
        nested: &Record,
        mapping: &Mapping<'_>,
        depth: usize,
    ) -> Result<(), ImportError> {
        self.import_attributes_for(nested, mapping)?;
        self.build_relationships_for(nested, mapping, depth + 1)
    }

    fn link(
        &mut self,
        id: RecordId,
        relation: &RelationDef,
        target: RecordId,
    ) -> Result<(), ImportError> {
        if relation.cardinality.is_many() {
            self.store.add_to_relation(id, &relation.name, target)?;
        } else {
            self.store.set_relation(id, &relation.name, target)?;
        }
        self.stats.relations_linked += 1;

        Ok(())
    }
}
