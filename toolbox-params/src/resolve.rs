//! Parameter resolution ordering (§4.3 rule: claim-bind > request body > default > missing).

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ParamError;
use crate::parameter::Parameter;
use crate::parse::parse_value;
use crate::value::{ParamValue, ParamValues};

/// Verified claims for a single auth service, keyed by claim field name.
pub type ClaimSet = HashMap<String, Value>;

/// Verified claims across every auth service the request authenticated against,
/// keyed by auth-service name.
#[derive(Debug, Clone, Default)]
pub struct VerifiedClaims {
    by_service: HashMap<String, ClaimSet>,
}

impl VerifiedClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: impl Into<String>, claims: ClaimSet) {
        self.by_service.insert(service.into(), claims);
    }

    /// Names of every auth service the caller successfully verified against,
    /// for checking a tool's `authRequired` list (§4.5 rule 2).
    pub fn verified_services(&self) -> Vec<String> {
        self.by_service.keys().cloned().collect()
    }

    fn field(&self, service: &str, field: &str) -> Option<&Value> {
        self.by_service.get(service).and_then(|claims| claims.get(field))
    }
}

/// Resolve one declared parameter against a request body and verified claims,
/// applying the fixed precedence: claim-bind, then request body, then default,
/// then "missing required parameter".
///
/// A client attempting to override a claim-bound parameter via the request body
/// is rejected outright rather than silently ignored, so callers can't probe
/// whether a binding exists by trial and error.
pub fn resolve_one(
    param: &Parameter,
    body: Option<&Value>,
    claims: &VerifiedClaims,
) -> Result<ParamValue, ParamError> {
    if param.is_claim_bound() {
        if body.is_some() {
            return Err(ParamError::ClaimBoundOverride {
                name: param.name.clone(),
            });
        }
        // First declared auth service binding that actually produced a claim wins.
        for binding in &param.auth_services {
            if let Some(claim) = claims.field(&binding.name, &binding.field) {
                return parse_value(param, claim);
            }
        }
        let binding = &param.auth_services[0];
        return Err(ParamError::MissingClaim {
            name: param.name.clone(),
            service: binding.name.clone(),
            field: binding.field.clone(),
        });
    }

    if let Some(value) = body {
        return parse_value(param, value);
    }

    if let Some(default) = &param.default {
        return parse_value(param, default);
    }

    if param.is_required() {
        return Err(ParamError::Missing {
            name: param.name.clone(),
        });
    }

    // Not required and no default: resolves to JSON null coerced through the
    // declared type is meaningless, so callers are expected to filter optional
    // unset parameters out of the resolved set upstream (see resolve_all).
    Err(ParamError::Missing {
        name: param.name.clone(),
    })
}

/// Resolve every declared parameter, skipping optional parameters that end up
/// unset rather than failing the whole invocation.
pub fn resolve_all(
    params: &[Parameter],
    body: &Value,
    claims: &VerifiedClaims,
) -> Result<ParamValues, ParamError> {
    let mut resolved = ParamValues::new();
    let body_obj = body.as_object();

    for param in params {
        let body_value = body_obj.and_then(|obj| obj.get(&param.name));
        match resolve_one(param, body_value, claims) {
            Ok(value) => resolved.push(param.name.clone(), value),
            Err(ParamError::Missing { .. }) if !param.is_required() => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(resolved)
}
