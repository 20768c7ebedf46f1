use crate::{MAX_ENTITY_NAME_LEN, SchemaError, node::EntityDef};
use std::collections::BTreeMap;

///
/// SchemaRegistry
///
/// Explicit entity-type registry: declared type name → schema definition.
/// Built once at startup and passed by reference wherever a mapping is
/// constructed. Registration rejects duplicates immediately; cross-entity
/// consistency (relation destinations, primary-key fields) is checked by
/// `validate`, which callers should run after the last `register`.
///

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<String, EntityDef>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity definition under its declared name.
    pub fn register(&mut self, entity: EntityDef) -> Result<(), SchemaError> {
        if entity.name.len() > MAX_ENTITY_NAME_LEN {
            return Err(SchemaError::EntityNameTooLong {
                name: entity.name,
                max: MAX_ENTITY_NAME_LEN,
            });
        }
        if self.entities.contains_key(&entity.name) {
            return Err(SchemaError::DuplicateEntity(entity.name));
        }

        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    pub fn try_entity(&self, name: &str) -> Result<&EntityDef, SchemaError> {
        self.entities
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    /// Iterate registered definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    /// Check cross-entity consistency: every designated primary key resolves
    /// to a defined field and every relation targets a registered entity.
    /// Fails on the first issue found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for entity in self.entities.values() {
            if let Some(pk) = &entity.primary_key
                && entity.field(pk).is_none()
            {
                return Err(SchemaError::MissingPrimaryKeyField {
                    entity: entity.name.clone(),
                    field: pk.clone(),
                });
            }

            for relation in &entity.relations {
                if !self.entities.contains_key(&relation.destination) {
                    return Err(SchemaError::UnknownDestination {
                        entity: entity.name.clone(),
                        relation: relation.name.clone(),
                        destination: relation.destination.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
