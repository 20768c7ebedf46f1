mod memory;

pub use memory::MemoryStore;

use crate::value::{KeyValue, Value};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error as ThisError;

///
/// RecordId
///
/// Opaque handle to one persisted record. Identifiers are store-assigned and
/// unique within one store; the engine and cache only hold copies.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("entity '{0}' is not known to the store")]
    UnknownEntity(String),

    #[error("record {0} is not present in the store")]
    UnknownRecord(RecordId),

    #[error("store backend error: {message}")]
    Backend { message: String },
}

///
/// Store
///
/// Narrow persistence interface consumed by the import engine. The engine
/// never deletes, never commits, and never queries by anything other than a
/// key-membership predicate; schema knowledge stays in the registry.
///

pub trait Store {
    /// Insert an empty record of the given entity type.
    fn insert_new(&mut self, entity: &str) -> Result<RecordId, StoreError>;

    /// Fetch all records of `entity` whose `field` value is a member of
    /// `keys`. Must support at least `keys.len()` bound values.
    fn bulk_fetch(
        &mut self,
        entity: &str,
        field: &str,
        keys: &BTreeSet<KeyValue>,
    ) -> Result<Vec<RecordId>, StoreError>;

    /// Read a field; `None` when the record or the field is absent.
    fn get(&self, id: RecordId, field: &str) -> Option<Value>;

    /// Write a field.
    fn set(&mut self, id: RecordId, field: &str, value: Value) -> Result<(), StoreError>;

    /// Point a to-one relation at `target`, replacing any previous link.
    fn set_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError>;

    /// Add `target` to a to-many relation collection. Set semantics: adding
    /// a member twice is a no-op.
    fn add_to_relation(
        &mut self,
        id: RecordId,
        relation: &str,
        target: RecordId,
    ) -> Result<(), StoreError>;
}
