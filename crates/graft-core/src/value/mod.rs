mod coerce;


use crate::representation::Record;
use serde::Serialize;
use std::fmt;

pub(crate) use coerce::coerce_field_value;

///
/// Value
///
/// Tagged runtime value for external payload fields and persisted record
/// fields. `Null` is a present-but-null payload value; an *absent* field is
/// simply not in the record.
///
/// `Timestamp` is unix seconds, UTC.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Record(Record),
    Text(String),
    Timestamp(i64),
    Uint(u64),
}

impl Value {
    ///
    /// TYPES
    ///

    /// Returns true for the scalar variants, the shapes a foreign-key-only
    /// relationship value may take.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        match self {
            Self::List(_) | Self::Record(_) | Self::Null => false,
            _ => true,
        }
    }

    ///
    /// CONVERSION
    ///

    /// Project this value to a hashable primary-key form.
    ///
    /// Only `Int`, `Uint`, and `Text` are keyable; everything else yields
    /// `None`, which downstream treats as "cannot be matched".
    #[must_use]
    pub fn as_key(&self) -> Option<KeyValue> {
        match self {
            Self::Int(i) => Some(KeyValue::Int(*i)),
            Self::Text(s) => Some(KeyValue::Text(s.clone())),
            Self::Uint(u) => Some(KeyValue::Uint(*u)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        if let Self::Record(record) = self {
            Some(record)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(items) = self {
            Some(items.as_slice())
        } else {
            None
        }
    }

    /// Render a scalar as text, for merging into `Text`-kinded fields.
    ///
    /// `Null`, records, and lists have no text rendering.
    #[must_use]
    pub fn to_coerced_text(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Timestamp(t) => Some(t.to_string()),
            Self::Uint(u) => Some(u.to_string()),
            Self::List(_) | Self::Record(_) | Self::Null => None,
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool   => Bool,
    f32    => Float,
    f64    => Float,
    i8     => Int,
    i16    => Int,
    i32    => Int,
    i64    => Int,
    &str   => Text,
    String => Text,
    u8     => Uint,
    u16    => Uint,
    u32    => Uint,
    u64    => Uint,
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<Record>> for Value {
    fn from(records: Vec<Record>) -> Self {
        Self::List(records.into_iter().map(Self::Record).collect())
    }
}

impl From<KeyValue> for Value {
    fn from(key: KeyValue) -> Self {
        match key {
            KeyValue::Int(i) => Self::Int(i),
            KeyValue::Text(s) => Self::Text(s),
            KeyValue::Uint(u) => Self::Uint(u),
        }
    }
}

// Payloads arrive as parsed JSON in practice; numbers prefer the unsigned
// variant, then signed, then float.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

///
/// KeyValue
///
/// Hashable scalar projection of `Value`, used wherever a primary-key value
/// keys a map: the identity cache tables and the store's bulk-fetch set.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum KeyValue {
    Int(i64),
    Text(String),
    Uint(u64),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Uint(u) => write!(f, "{u}"),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for KeyValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
