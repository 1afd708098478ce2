//! Parsed parameter values (§3 Data Model: ParamValue).

use indexmap::IndexMap;
use serde_json::Value;

/// A parsed, type-checked parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ParamValue>),
    Map(IndexMap<String, ParamValue>),
}

impl ParamValue {
    /// Render back to a `serde_json::Value`, e.g. for echoing defaults in a manifest
    /// or for property-test round-tripping (§8 law 2).
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Array(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            Self::Map(entries) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in entries {
                    obj.insert(k.clone(), v.to_json());
                }
                Value::Object(obj)
            }
        }
    }

    /// Render as a template-lane string for `{{.name}}` substitution (§4.3).
    pub fn as_template_literal(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Array(items) => items
                .iter()
                .map(ParamValue::as_template_literal)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(entries) => entries
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.as_template_literal()))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// One resolved `(name, value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValueEntry {
    pub name: String,
    pub value: ParamValue,
}

/// An ordered sequence of resolved parameters, preserving declaration order (§3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamValues {
    entries: Vec<ParamValueEntry>,
}

impl ParamValues {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.entries.push(ParamValueEntry {
            name: name.into(),
            value,
        });
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamValueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a bind-lane ordered list of JSON values, the shape a parameterized
    /// driver API (`$1`, `$2`, ...) expects (§4.3 Safety contract).
    pub fn as_bind_values(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.value.to_json()).collect()
    }
}
