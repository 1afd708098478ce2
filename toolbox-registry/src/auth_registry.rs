//! Auth-service kind registry (§4.1, §4.4).
//!
//! `"oidc"` is the one built-in kind: auth-service verification is core
//! functionality (§2 component D), not an external collaborator, so unlike
//! the source and tool registries this one ships a default registration.

use serde_json::Value;

use toolbox_auth::AuthServiceConfig;
use toolbox_core::{Result, ToolboxError};

use crate::kind_registry::KindRegistry;

pub trait AuthServiceFactory: Send + Sync {
    fn kind(&self) -> &'static str;

    fn build(&self, name: &str, raw: &Value) -> Result<AuthServiceConfig>;
}

pub type AuthServiceRegistry = KindRegistry<dyn AuthServiceFactory>;

/// Decodes the built-in `{ kind: "oidc", issuer, clientId, jwksUrl? }` shape
/// (§6) into an `AuthServiceConfig`.
pub struct OidcAuthServiceFactory;

impl AuthServiceFactory for OidcAuthServiceFactory {
    fn kind(&self) -> &'static str {
        "oidc"
    }

    fn build(&self, name: &str, raw: &Value) -> Result<AuthServiceConfig> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolboxError::Config(format!("authService '{name}' must be a YAML mapping"))
        })?;
        let issuer = obj
            .get("issuer")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolboxError::Config(format!("authService '{name}' is missing 'issuer'")))?
            .to_string();
        let client_id = obj.get("clientId").and_then(Value::as_str).map(str::to_string);
        let jwks_url = obj.get("jwksUrl").and_then(Value::as_str).map(str::to_string);

        Ok(AuthServiceConfig {
            name: name.to_string(),
            kind: "oidc".to_string(),
            issuer,
            client_id,
            jwks_url,
        })
    }
}

/// Build an `AuthServiceRegistry` pre-populated with the built-in `oidc` kind.
pub fn default_auth_service_registry() -> AuthServiceRegistry {
    let registry = AuthServiceRegistry::new("auth-service");
    registry.register("oidc", std::sync::Arc::new(OidcAuthServiceFactory));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oidc_factory_decodes_issuer_and_client_id() {
        let registry = default_auth_service_registry();
        let factory = registry.get("oidc").unwrap();
        let config = factory
            .build("google", &json!({"issuer": "https://accounts.google.com", "clientId": "abc"}))
            .unwrap();
        assert_eq!(config.issuer, "https://accounts.google.com");
        assert_eq!(config.client_id.as_deref(), Some("abc"));
    }

    #[test]
    fn oidc_factory_requires_issuer() {
        let registry = default_auth_service_registry();
        let factory = registry.get("oidc").unwrap();
        let err = factory.build("google", &json!({})).unwrap_err();
        assert!(matches!(err, ToolboxError::Config(_)));
    }
}
