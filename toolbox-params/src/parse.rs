//! JSON -> `ParamValue` coercion and validation (§4.3 rule: parse parameters).

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParamError;
use crate::parameter::Parameter;
use crate::types::ParamType;
use crate::value::ParamValue;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Coerce and validate a single JSON value against its `Parameter` declaration.
///
/// Integers are accepted only from whole JSON numbers; floats accept both integer
/// and fractional JSON numbers. Booleans accept only literal `true`/`false` (no
/// truthy-string coercion). Array and map cardinality and element types are
/// checked recursively.
pub fn parse_value(param: &Parameter, raw: &Value) -> Result<ParamValue, ParamError> {
    match param.param_type {
        ParamType::String => match raw {
            Value::String(s) => Ok(ParamValue::String(s.clone())),
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "string",
                actual: type_name(other),
            }),
        },
        ParamType::Integer => match raw {
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                n.as_i64().map(ParamValue::Integer).ok_or_else(|| ParamError::WrongType {
                    name: param.name.clone(),
                    expected: "integer",
                    actual: "number (out of i64 range)",
                })
            }
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "integer",
                actual: type_name(other),
            }),
        },
        ParamType::Float => match raw {
            Value::Number(n) => n
                .as_f64()
                .map(ParamValue::Float)
                .ok_or_else(|| ParamError::WrongType {
                    name: param.name.clone(),
                    expected: "float",
                    actual: type_name(raw),
                }),
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "float",
                actual: type_name(other),
            }),
        },
        ParamType::Boolean => match raw {
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "boolean",
                actual: type_name(other),
            }),
        },
        ParamType::Array => match raw {
            Value::Array(items) => {
                let item_param = param.items.as_deref().unwrap_or(param);
                let mut parsed = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let value = parse_value(item_param, item).map_err(|source| {
                        ParamError::ArrayElement {
                            name: param.name.clone(),
                            index,
                            source: Box::new(source),
                        }
                    })?;
                    parsed.push(value);
                }
                Ok(ParamValue::Array(parsed))
            }
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "array",
                actual: type_name(other),
            }),
        },
        ParamType::Map => match raw {
            Value::Object(entries) => {
                let value_type = param.value_type.unwrap_or(ParamType::String);
                let value_param = Parameter {
                    name: param.name.clone(),
                    param_type: value_type,
                    description: String::new(),
                    required: Some(true),
                    default: None,
                    auth_services: vec![],
                    items: None,
                    value_type: None,
                    allowed_keys: None,
                    allow_unsafe_template_value: param.allow_unsafe_template_value,
                };
                let mut parsed = IndexMap::new();
                for (key, value) in entries {
                    if let Some(allowed) = &param.allowed_keys {
                        if !allowed.iter().any(|k| k == key) {
                            return Err(ParamError::DisallowedKey {
                                name: param.name.clone(),
                                key: key.clone(),
                            });
                        }
                    }
                    let parsed_value =
                        parse_value(&value_param, value).map_err(|source| ParamError::MapValue {
                            name: param.name.clone(),
                            key: key.clone(),
                            source: Box::new(source),
                        })?;
                    parsed.insert(key.clone(), parsed_value);
                }
                Ok(ParamValue::Map(parsed))
            }
            other => Err(ParamError::WrongType {
                name: param.name.clone(),
                expected: "map",
                actual: type_name(other),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use serde_json::json;

    fn param(param_type: ParamType) -> Parameter {
        Parameter {
            name: "p".into(),
            param_type,
            description: String::new(),
            required: None,
            default: None,
            auth_services: vec![],
            items: None,
            value_type: None,
            allowed_keys: None,
            allow_unsafe_template_value: false,
        }
    }

    #[test]
    fn integer_rejects_fractional_number() {
        let p = param(ParamType::Integer);
        let err = parse_value(&p, &json!(1.5)).unwrap_err();
        assert!(matches!(err, ParamError::WrongType { .. }));
    }

    #[test]
    fn float_accepts_whole_number() {
        let p = param(ParamType::Float);
        let value = parse_value(&p, &json!(4)).unwrap();
        assert_eq!(value, ParamValue::Float(4.0));
    }

    #[test]
    fn boolean_rejects_truthy_string() {
        let p = param(ParamType::Boolean);
        let err = parse_value(&p, &json!("true")).unwrap_err();
        assert!(matches!(err, ParamError::WrongType { .. }));
    }

    #[test]
    fn array_validates_each_element() {
        let mut p = param(ParamType::Array);
        p.items = Some(Box::new(param(ParamType::Integer)));
        let err = parse_value(&p, &json!([1, "two", 3])).unwrap_err();
        match err {
            ParamError::ArrayElement { index, .. } => assert_eq!(index, 1),
            other => panic!("expected ArrayElement, got {other:?}"),
        }
    }

    #[test]
    fn map_enforces_allowed_keys() {
        let mut p = param(ParamType::Map);
        p.allowed_keys = Some(vec!["name".into()]);
        let err = parse_value(&p, &json!({"other": "x"})).unwrap_err();
        assert!(matches!(err, ParamError::DisallowedKey { .. }));
    }

    #[test]
    fn map_without_allow_list_accepts_any_key() {
        let p = param(ParamType::Map);
        let value = parse_value(&p, &json!({"a": "1", "b": "2"})).unwrap();
        match value {
            ParamValue::Map(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected Map, got {other:?}"),
        }
    }
}
