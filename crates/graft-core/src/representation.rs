//! External representation normalization.

use crate::value::Value;
use std::collections::BTreeMap;
use std::slice;

/// A single external record: field name → value.
pub type Record = BTreeMap<String, Value>;

///
/// Representation
///
/// Normalized external payload: one record or a sequence of records.
/// Extracting the records from a wrapper payload is the caller's concern;
/// `from_value_at` covers the common records-under-a-root-key shape.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Representation {
    One(Record),
    Many(Vec<Record>),
}

impl Representation {
    /// Normalize a payload value. A record becomes `One`; a list becomes
    /// `Many` when every element is a record; anything else is not a
    /// representation.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Record(record) => Some(Self::One(record)),
            Value::List(items) => items
                .into_iter()
                .map(|item| {
                    if let Value::Record(record) = item {
                        Some(record)
                    } else {
                        None
                    }
                })
                .collect::<Option<Vec<_>>>()
                .map(Self::Many),
            _ => None,
        }
    }

    /// Normalize the payload found under `root_key` of a wrapper record.
    #[must_use]
    pub fn from_value_at(value: Value, root_key: &str) -> Option<Self> {
        if let Value::Record(mut wrapper) = value {
            wrapper.remove(root_key).and_then(Self::from_value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        Self::from_value(Value::from(json))
    }

    /// The records to import, in payload order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::One(record) => slice::from_ref(record),
            Self::Many(records) => records,
        }
    }
}

impl From<Record> for Representation {
    fn from(record: Record) -> Self {
        Self::One(record)
    }
}

impl From<Vec<Record>> for Representation {
    fn from(records: Vec<Record>) -> Self {
        Self::Many(records)
    }
}
