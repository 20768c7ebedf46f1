//! Schema AST and registry for the graft import engine: entity, field, and
//! relation definitions plus the `SchemaRegistry` built once at startup and
//! consulted wherever an entity mapping is constructed.

pub mod node;
pub mod registry;
pub mod types;

use thiserror::Error as ThisError;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for field and relation schema identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        SchemaError,
        node::{EntityDef, FieldDef, RelationDef},
        registry::SchemaRegistry,
        types::{Cardinality, FieldKind},
    };
}

///
/// SchemaError
///
/// Registration and validation failures. These are programmer/schema errors;
/// the import runtime tolerates an invalid registry by skipping the affected
/// relationships, so validation is advisory.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),

    #[error("entity name '{name}' exceeds max length {max}")]
    EntityNameTooLong { name: String, max: usize },

    #[error("entity '{0}' is not registered")]
    UnknownEntity(String),

    #[error("entity '{entity}': primary key names undefined field '{field}'")]
    MissingPrimaryKeyField { entity: String, field: String },

    #[error(
        "entity '{entity}': relation '{relation}' targets unregistered entity '{destination}'"
    )]
    UnknownDestination {
        entity: String,
        relation: String,
        destination: String,
    },
}
