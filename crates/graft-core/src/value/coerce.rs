//! Field-value coercion applied during the field-merge phase.
//!
//! Only two conversions are part of the contract: `Timestamp` fields parse
//! text per the field's configured format (RFC 3339 when unset), and `Text`
//! fields stringify non-text scalars. Every other kind writes the payload
//! value as-is. A value that cannot be coerced is absent, never an error.

use crate::value::Value;
use graft_schema::types::FieldKind;
use time::{Date, OffsetDateTime, PrimitiveDateTime, format_description};
use tracing::{debug, warn};

/// Coerce a payload value for a field of the given kind.
///
/// `None` means "skip this field": the persisted value stays untouched.
pub(crate) fn coerce_field_value(
    value: &Value,
    kind: FieldKind,
    date_format: Option<&str>,
) -> Option<Value> {
    match kind {
        FieldKind::Timestamp => coerce_timestamp(value, date_format),
        FieldKind::Text => match value {
            Value::Null => Some(Value::Null),
            other => other.to_coerced_text().map(Value::Text),
        },
        _ => match value {
            Value::List(_) | Value::Record(_) => None,
            other => Some(other.clone()),
        },
    }
}

fn coerce_timestamp(value: &Value, date_format: Option<&str>) -> Option<Value> {
    match value {
        Value::Timestamp(t) => Some(Value::Timestamp(*t)),
        // numeric payload values are taken as unix seconds
        Value::Int(i) => Some(Value::Timestamp(*i)),
        Value::Uint(u) => i64::try_from(*u).ok().map(Value::Timestamp),
        Value::Text(s) => {
            let parsed = parse_datetime(s, date_format);
            if parsed.is_none() {
                debug!(value = %s, "timestamp value failed to parse, field skipped");
            }
            parsed.map(Value::Timestamp)
        }
        _ => None,
    }
}

/// Parse a datetime string into unix seconds, trying offset datetime, then
/// naive datetime assumed UTC, then a bare date at midnight UTC.
fn parse_datetime(text: &str, date_format: Option<&str>) -> Option<i64> {
    let Some(fmt) = date_format else {
        return OffsetDateTime::parse(text, &format_description::well_known::Rfc3339)
            .ok()
            .map(OffsetDateTime::unix_timestamp);
    };

    let format = match format_description::parse(fmt) {
        Ok(format) => format,
        Err(err) => {
            // configuration error, not a data error
            warn!(format = %fmt, error = %err, "invalid date format description");
            return None;
        }
    };

    if let Ok(dt) = OffsetDateTime::parse(text, &format) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = PrimitiveDateTime::parse(text, &format) {
        return Some(dt.assume_utc().unix_timestamp());
    }

    Date::parse(text, &format)
        .ok()
        .map(|d| d.midnight().assume_utc().unix_timestamp())
}
