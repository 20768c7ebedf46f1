use crate::types::FieldKind;
use serde::Serialize;

///
/// FieldDef
///
/// One scalar field plus its import configuration: an optional alternate
/// lookup key (the external payload names the field differently, possibly as
/// a dotted path into nested records) and, for `Timestamp` fields, an
/// optional parse format.
///

#[derive(Clone, Debug, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            lookup_key: None,
            date_format: None,
        }
    }

    /// Read this field from a differently-named payload key. Dot-separated
    /// segments navigate nested records.
    #[must_use]
    pub fn with_lookup_key(mut self, key: impl Into<String>) -> Self {
        self.lookup_key = Some(key.into());
        self
    }

    /// Parse format for `Timestamp` fields, in `time` format-description
    /// syntax. RFC 3339 is assumed when unset.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// The payload key to read for this field.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.lookup_key.as_deref().unwrap_or(&self.name)
    }
}
