//! Lifecycle hooks.
//!
//! A capability interface with default implementations: domain code opts in
//! by implementing whichever subset it needs. Every method receives the
//! entity type name, the working persisted record, and the source record.

use crate::representation::Record;
use crate::store::RecordId;
use crate::value::Value;

///
/// ImportHooks
///

pub trait ImportHooks {
    /// Veto the whole field merge for a record. A vetoed record is still
    /// created and cached, so relations can link to it.
    fn should_import(&self, entity: &str, id: RecordId, record: &Record) -> bool {
        let _ = (entity, id, record);
        true
    }

    /// Veto one field write. Consulted only for values that differ from the
    /// persisted state.
    fn should_import_field(
        &self,
        entity: &str,
        field: &str,
        new_value: &Value,
        record: &Record,
    ) -> bool {
        let _ = (entity, field, new_value, record);
        true
    }

    /// Veto building one relation of one record.
    fn should_build_relation(
        &self,
        entity: &str,
        relation: &str,
        value: &Value,
        record: &Record,
    ) -> bool {
        let _ = (entity, relation, value, record);
        true
    }

    /// Fired before the field merge of a record that passed `should_import`.
    fn will_import(&self, entity: &str, id: RecordId, record: &Record) {
        let _ = (entity, id, record);
    }

    /// Fired after a record's relations have been built.
    fn did_import(&self, entity: &str, id: RecordId, record: &Record) {
        let _ = (entity, id, record);
    }
}

///
/// NoHooks
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl ImportHooks for NoHooks {}
