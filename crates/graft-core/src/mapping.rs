//! Per-entity adapter between external records and the schema.

use crate::hooks::ImportHooks;
use crate::representation::Record;
use crate::store::{RecordId, Store, StoreError};
use crate::value::{KeyValue, Value, coerce_field_value};
use graft_schema::node::{EntityDef, FieldDef, RelationDef};
use graft_schema::registry::SchemaRegistry;
use tracing::debug;

///
/// Mapping
///
/// Borrowed per-entity view over the registry. Construction is two pointer
/// copies, so relation-target mappings are rebuilt on demand; a relation
/// whose destination is this entity resolves to a copy of `self`.
///

#[derive(Clone, Copy, Debug)]
pub struct Mapping<'a> {
    entity: &'a EntityDef,
    registry: &'a SchemaRegistry,
}

impl<'a> Mapping<'a> {
    #[must_use]
    pub fn new(registry: &'a SchemaRegistry, entity: &str) -> Option<Self> {
        Some(Self {
            entity: registry.entity(entity)?,
            registry,
        })
    }

    #[must_use]
    pub fn entity_name(&self) -> &'a str {
        &self.entity.name
    }

    #[must_use]
    pub fn relations(&self) -> &'a [RelationDef] {
        &self.entity.relations
    }

    #[must_use]
    pub fn primary_key_field(&self) -> Option<&'a FieldDef> {
        self.entity.primary_key_field()
    }

    /// Mapping for a relation's destination type; `None` is a configuration
    /// error the caller logs and skips.
    #[must_use]
    pub fn relation_mapping(&self, relation: &RelationDef) -> Option<Self> {
        if relation.destination == self.entity.name {
            Some(*self)
        } else {
            Self::new(self.registry, &relation.destination)
        }
    }

    ///
    /// RECORD ACCESS
    ///

    #[must_use]
    pub fn value_for_field<'r>(&self, record: &'r Record, field: &FieldDef) -> Option<&'r Value> {
        value_at_path(record, field.lookup_key())
    }

    #[must_use]
    pub fn value_for_relation<'r>(
        &self,
        record: &'r Record,
        relation: &RelationDef,
    ) -> Option<&'r Value> {
        value_at_path(record, relation.lookup_key())
    }

    /// The record's primary-key value; absent when no primary key is
    /// configured, the payload lacks the field, or the value is not keyable.
    #[must_use]
    pub fn primary_key_value(&self, record: &Record) -> Option<KeyValue> {
        let field = self.primary_key_field()?;
        value_at_path(record, field.lookup_key())?.as_key()
    }

    /// The primary-key value of an already-persisted record.
    #[must_use]
    pub fn primary_key_of<S: Store>(&self, store: &S, id: RecordId) -> Option<KeyValue> {
        let field = self.primary_key_field()?;
        store.get(id, &field.name)?.as_key()
    }

    ///
    /// PERSISTENCE
    ///

    /// Insert a new record; when a primary key is configured and present in
    /// the source, it is set immediately so the record is identifiable
    /// before the field merge runs.
    pub fn create_record<S: Store>(
        &self,
        store: &mut S,
        record: &Record,
    ) -> Result<RecordId, StoreError> {
        let id = store.insert_new(&self.entity.name)?;

        if let Some(field) = self.primary_key_field()
            && let Some(key) = self.primary_key_value(record)
        {
            store.set(id, &field.name, key.into())?;
        }

        Ok(id)
    }

    /// Insert a new record carrying only its primary key. Used for
    /// foreign-key-only relation values with no nested record body.
    pub fn create_with_key<S: Store>(
        &self,
        store: &mut S,
        key: &KeyValue,
    ) -> Result<RecordId, StoreError> {
        let id = store.insert_new(&self.entity.name)?;

        if let Some(field) = self.primary_key_field() {
            store.set(id, &field.name, key.clone().into())?;
        }

        Ok(id)
    }

    /// Merge the record's fields into the persisted record. Absent fields
    /// are left untouched (partial payloads are supported); unchanged values
    /// are not rewritten; the per-field hook may veto a changed value.
    ///
    /// Returns the number of writes performed.
    pub fn update_fields<S: Store>(
        &self,
        store: &mut S,
        id: RecordId,
        record: &Record,
        hooks: &dyn ImportHooks,
    ) -> Result<usize, StoreError> {
        let mut writes = 0;

        for field in &self.entity.fields {
            let Some(raw) = self.value_for_field(record, field) else {
                continue;
            };
            let Some(new_value) = coerce_field_value(raw, field.kind, field.date_format.as_deref())
            else {
                debug!(
                    entity = %self.entity.name,
                    field = %field.name,
                    "field value not coercible, skipped"
                );
                continue;
            };

            if store
                .get(id, &field.name)
                .is_some_and(|current| current == new_value)
            {
                continue;
            }
            if !hooks.should_import_field(&self.entity.name, &field.name, &new_value, record) {
                continue;
            }

            store.set(id, &field.name, new_value)?;
            writes += 1;
        }

        Ok(writes)
    }
}

/// Navigate a dotted lookup path (`a.b.c`) through nested records. An absent
/// or non-record intermediate segment makes the whole value absent.
fn value_at_path<'r>(record: &'r Record, path: &str) -> Option<&'r Value> {
    let mut current = record;
    let mut segments = path.split('.').peekable();

    loop {
        let segment = segments.next()?;
        if segments.peek().is_none() {
            return current.get(segment);
        }
        current = current.get(segment)?.as_record()?;
    }
}
