//! Parameter descriptors (§3 Data Model: Parameter; §6 config shape).

use serde::{Deserialize, Serialize};

use crate::types::ParamType;

/// Binds a parameter's value to a verified auth-service claim rather than the
/// request body (§3, §4.3 rule 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthServiceBinding {
    /// Name of the declared auth service.
    pub name: String,
    /// Claim field within that service's verified claim map.
    pub field: String,
}

/// A typed, named parameter declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
    /// Defaults to `true` unless a `default` is present (§3 invariant).
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(rename = "authServices", default)]
    pub auth_services: Vec<AuthServiceBinding>,
    /// Item descriptor for `array`-typed parameters.
    #[serde(default)]
    pub items: Option<Box<Parameter>>,
    /// Value type for `map`-typed parameters.
    #[serde(rename = "valueType", default)]
    pub value_type: Option<ParamType>,
    /// Optional allow-list of keys for `map`-typed parameters.
    #[serde(rename = "allowedKeys", default)]
    pub allowed_keys: Option<Vec<String>>,
    /// When `true`, a `string`-typed template parameter is exempt from the
    /// identifier-shape whitelist (§4.3 Safety contract). Only meaningful on
    /// template-parameter declarations; standard parameters ignore this flag since
    /// they never reach the backend as text.
    #[serde(rename = "allowUnsafeTemplateValue", default)]
    pub allow_unsafe_template_value: bool,
}

impl Parameter {
    /// Whether the request body must supply this parameter absent a claim binding
    /// or default (§3 invariant: required defaults to true when no default).
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(self.default.is_none())
    }

    /// Whether this parameter's value is sourced from a verified claim.
    pub fn is_claim_bound(&self) -> bool {
        !self.auth_services.is_empty()
    }
}
