//! Result normalization (§4.5 step 6): coerce whatever a backend driver hands back
//! into a JSON-serializable value with a small, predictable shape.

use base64::Engine;
use serde_json::{Map, Number, Value};

/// A single opaque scalar a driver can return, before normalization.
///
/// Concrete `Source`/`Tool` implementations are out of scope for this core (§1), but
/// they all funnel their results through this enum so normalization stays uniform
/// across backend families.
#[derive(Debug, Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A driver-specific arbitrary-precision numeric, rendered as a decimal string
    /// (e.g. Postgres `NUMERIC`, BigQuery `BIGNUMERIC`).
    Decimal(String),
    Text(String),
    /// Raw bytes: normalized to UTF-8 text when valid, base64 otherwise.
    Bytes(Vec<u8>),
    Array(Vec<RawValue>),
    Row(Vec<(String, RawValue)>),
}

/// Normalize a single raw value into the JSON value the transport will serialize.
pub fn normalize(value: RawValue) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::Int(i) => Value::Number(Number::from(i)),
        RawValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        RawValue::Decimal(d) => Value::String(trim_decimal(&d)),
        RawValue::Text(s) => Value::String(s),
        RawValue::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(s) if s.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') => {
                Value::String(s)
            }
            _ => Value::String(base64::engine::general_purpose::STANDARD.encode(&bytes)),
        },
        RawValue::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        RawValue::Row(cols) => {
            let mut map = Map::new();
            for (name, val) in cols {
                map.insert(name, normalize(val));
            }
            Value::Object(map)
        }
    }
}

/// Normalize a set of result rows the way SQL-shaped tools do: a list of
/// column-name -> value maps (§4.5 step 6).
pub fn normalize_rows(rows: Vec<Vec<(String, RawValue)>>) -> Value {
    Value::Array(
        rows.into_iter()
            .map(RawValue::Row)
            .map(normalize)
            .collect(),
    )
}

/// Trim trailing zeros off a driver-emitted decimal string without touching the
/// integer part or the sign, e.g. `"1.500000"` -> `"1.5"`, `"2.000000"` -> `"2"`.
fn trim_decimal(raw: &str) -> String {
    if !raw.contains('.') {
        return raw.to_string();
    }
    let trimmed = raw.trim_end_matches('0');
    let trimmed = trimmed.trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
