use crate::node::{FieldDef, RelationDef};
use serde::Serialize;

///
/// EntityDef
///
/// Schema definition for one entity type. `primary_key` names the field whose
/// value identifies a record externally. An entity without one is legal;
/// its records are always created fresh, never matched against the store.
///

#[derive(Clone, Debug, Serialize)]
pub struct EntityDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub relations: Vec<RelationDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl EntityDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
            primary_key: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Designate the field whose value is the external identity of a record.
    #[must_use]
    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = Some(field.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolve the designated primary-key field, if both the designation and
    /// the field itself exist.
    #[must_use]
    pub fn primary_key_field(&self) -> Option<&FieldDef> {
        self.field(self.primary_key.as_deref()?)
    }
}
