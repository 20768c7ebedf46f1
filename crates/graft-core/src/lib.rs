//! Runtime for the graft import engine: the tagged value model, external
//! representation normalization, the narrow store interface, per-entity
//! mappings, the two-phase identity cache, and the import session that
//! orchestrates them.

pub mod cache;
pub mod error;
pub mod hooks;
pub mod import;
pub mod mapping;
pub mod representation;
pub mod store;
pub mod value;

// re-export the schema crate so callers depend on one name
pub use graft_schema as schema;

pub use import::import_representation;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Maximum nesting depth followed through relationship recursion.
///
/// Guards the prefetch scan and the attribute/relationship recursion against
/// cyclic or runaway payloads; deeper levels are logged and skipped.
pub const MAX_NEST_DEPTH: usize = 64;

///
/// Prelude
///
/// Domain vocabulary only; stores and error types are imported from their
/// modules where needed.
///

pub mod prelude {
    pub use crate::{
        cache::IdentityCache,
        hooks::{ImportHooks, NoHooks},
        import::{ImportSession, ImportStats, import_representation},
        mapping::Mapping,
        representation::{Record, Representation},
        store::{RecordId, Store},
        value::{KeyValue, Value},
    };
    pub use graft_schema::prelude::*;
}
