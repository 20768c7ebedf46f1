use serde::Serialize;

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    /// Returns true for collection-valued relations.
    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::Many)
    }
}

///
/// FieldKind
///
/// Scalar type surface for schema fields, aligned with the runtime `Value`
/// variants. Relations are not fields; they carry their own definitions.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FieldKind {
    Bool,
    Float,
    Int,
    Text,
    Timestamp,
    Uint,
}
