use crate::types::Cardinality;
use serde::Serialize;

///
/// RelationDef
///
/// A named link to a destination entity type. The payload may supply its
/// value as a nested record, an array of nested records, or a bare foreign
/// key; cardinality decides how resolved targets are attached.
///

#[derive(Clone, Debug, Serialize)]
pub struct RelationDef {
    pub name: String,
    pub destination: String,
    pub cardinality: Cardinality,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_key: Option<String>,
}

impl RelationDef {
    #[must_use]
    pub fn to_one(name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            cardinality: Cardinality::One,
            lookup_key: None,
        }
    }

    #[must_use]
    pub fn to_many(name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            cardinality: Cardinality::Many,
            lookup_key: None,
        }
    }

    /// Read this relation from a differently-named payload key.
    #[must_use]
    pub fn with_lookup_key(mut self, key: impl Into<String>) -> Self {
        self.lookup_key = Some(key.into());
        self
    }

    /// The payload key to read for this relation.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.lookup_key.as_deref().unwrap_or(&self.name)
    }
}
