//! Toolset grouping and manifest generation (§4.7).
//!
//! At the end of config loading, every declared toolset gets two cached
//! manifests built eagerly: the native manifest (full parameter descriptors,
//! used by `GET /api/toolset`) and the MCP input-schema manifest (JSON Schema
//! per tool, used by `tools/list`). Both are insertion-ordered so repeated
//! requests diff cleanly.

use indexmap::IndexMap;
use serde_json::{json, Value};

use toolbox_interfaces::Tool;
use toolbox_params::{ParamType, Parameter};

use crate::tool_registry::ToolMap;

/// A named grouping of tools (§4.7). The implicit `""` toolset is built by
/// `Toolset::implicit_all`, containing every loaded tool in load order.
#[derive(Debug, Clone)]
pub struct Toolset {
    pub name: String,
    pub tool_names: Vec<String>,
}

impl Toolset {
    pub fn new(name: impl Into<String>, tool_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tool_names,
        }
    }

    /// The implicit `""` toolset containing every tool, in the order they were
    /// declared under `tools` (§4.7).
    pub fn implicit_all(tools: &ToolMap) -> Self {
        Self::new("", tools.keys().cloned().collect())
    }
}

/// Cached manifests for one toolset, built once at load time (§4.7).
#[derive(Debug, Clone)]
pub struct ToolsetManifests {
    /// `{ name, description, parameters, templateParameters, authRequired }`
    /// per tool, in toolset order.
    pub native: Value,
    /// `{ name, description, inputSchema }` per tool, the shape `tools/list`
    /// returns (§4.9).
    pub mcp: Value,
}

fn param_json_type(param_type: ParamType) -> &'static str {
    match param_type {
        ParamType::String => "string",
        ParamType::Integer => "integer",
        ParamType::Float => "number",
        ParamType::Boolean => "boolean",
        ParamType::Array => "array",
        ParamType::Map => "object",
    }
}

fn parameter_to_native(param: &Parameter) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("name".to_string(), json!(param.name));
    obj.insert("type".to_string(), json!(param.param_type.as_str()));
    obj.insert("description".to_string(), json!(param.description));
    obj.insert("required".to_string(), json!(param.is_required()));
    if let Some(default) = &param.default {
        obj.insert("default".to_string(), default.clone());
    }
    if !param.auth_services.is_empty() {
        obj.insert(
            "authServices".to_string(),
            json!(param
                .auth_services
                .iter()
                .map(|b| json!({"name": b.name, "field": b.field}))
                .collect::<Vec<_>>()),
        );
    }
    if let Some(items) = &param.items {
        obj.insert("items".to_string(), parameter_to_native(items));
    }
    if let Some(value_type) = param.value_type {
        obj.insert("valueType".to_string(), json!(value_type.as_str()));
    }
    if let Some(allowed) = &param.allowed_keys {
        obj.insert("allowedKeys".to_string(), json!(allowed));
    }
    Value::Object(obj)
}

fn parameter_to_json_schema(param: &Parameter) -> Value {
    let mut schema = serde_json::Map::new();
    schema.insert("type".to_string(), json!(param_json_type(param.param_type)));
    if !param.description.is_empty() {
        schema.insert("description".to_string(), json!(param.description));
    }
    match param.param_type {
        ParamType::Array => {
            let item_schema = param
                .items
                .as_deref()
                .map(parameter_to_json_schema)
                .unwrap_or_else(|| json!({"type": "string"}));
            schema.insert("items".to_string(), item_schema);
        }
        ParamType::Map => {
            if let Some(value_type) = param.value_type {
                schema.insert(
                    "additionalProperties".to_string(),
                    json!({"type": param_json_type(value_type)}),
                );
            }
        }
        _ => {}
    }
    Value::Object(schema)
}

fn tool_input_schema(tool: &dyn Tool) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in tool.parameters() {
        properties.insert(param.name.clone(), parameter_to_json_schema(param));
        if param.is_required() {
            required.push(json!(param.name));
        }
    }
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

/// Build both manifests for `toolset` against the fully loaded `tools` map.
/// Tools named by the toolset but absent from the tools map are a config-load
/// error caught earlier by cross-reference validation, so this assumes every
/// name resolves.
pub fn build_manifests(toolset: &Toolset, tools: &ToolMap) -> ToolsetManifests {
    let mut native_entries = Vec::with_capacity(toolset.tool_names.len());
    let mut mcp_entries = Vec::with_capacity(toolset.tool_names.len());

    for name in &toolset.tool_names {
        let Some(tool) = tools.get(name) else { continue };

        let mut native = serde_json::Map::new();
        native.insert("name".to_string(), json!(tool.name()));
        native.insert("description".to_string(), json!(tool.description()));
        native.insert(
            "parameters".to_string(),
            json!(tool.parameters().iter().map(parameter_to_native).collect::<Vec<_>>()),
        );
        native.insert(
            "templateParameters".to_string(),
            json!(tool
                .template_parameters()
                .iter()
                .map(parameter_to_native)
                .collect::<Vec<_>>()),
        );
        native.insert("authRequired".to_string(), json!(tool.auth_required()));
        native_entries.push(Value::Object(native));

        mcp_entries.push(json!({
            "name": tool.name(),
            "description": tool.description(),
            "inputSchema": tool_input_schema(tool.as_ref()),
        }));
    }

    ToolsetManifests {
        native: json!({ "name": toolset.name, "tools": native_entries }),
        mcp: json!({ "tools": mcp_entries }),
    }
}

/// Every declared toolset's manifests, keyed by toolset name, built once at
/// load time.
pub type ToolsetMap = IndexMap<String, ToolsetManifests>;
