//! Per-service bearer ID-token verification (§4.4).

use std::collections::HashMap;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::Value;

use toolbox_params::ClaimSet;

use crate::error::AuthError;
use crate::jwks::JwksCache;

/// A single `{ kind, issuer, clientId }` entry from the config's `authServices`
/// map (§6 wire shape). `kind` is carried for the kind registry (§2 component
/// A) even though `"oidc"` is presently the only built-in verifier.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub name: String,
    pub kind: String,
    pub issuer: String,
    pub client_id: Option<String>,
    /// Explicit JWKS URL; defaults to `<issuer>/.well-known/jwks.json`.
    pub jwks_url: Option<String>,
}

impl AuthServiceConfig {
    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("{}/.well-known/jwks.json", self.issuer.trim_end_matches('/')))
    }
}

/// Verifies bearer ID tokens for one configured auth service.
pub struct AuthServiceVerifier {
    config: AuthServiceConfig,
    jwks: JwksCache,
}

impl AuthServiceVerifier {
    pub async fn new(config: AuthServiceConfig) -> Result<Self, AuthError> {
        let jwks = JwksCache::new(config.name.clone(), config.jwks_url()).await?;
        Ok(Self { config, jwks })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Verify `token` (already stripped of any `Bearer ` prefix) and return its
    /// claims as a flat `{claim -> value}` map.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken {
            service: self.config.name.clone(),
            reason: format!("malformed header: {e}"),
        })?;

        let kid = header.kid.ok_or_else(|| AuthError::InvalidToken {
            service: self.config.name.clone(),
            reason: "missing 'kid' in token header".to_string(),
        })?;
        let key = self.jwks.decoding_key(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];
        validation.set_issuer(&[&self.config.issuer]);
        if let Some(client_id) = &self.config.client_id {
            validation.set_audience(&[client_id]);
        } else {
            validation.validate_aud = false;
        }

        let data = decode::<HashMap<String, Value>>(token, &key, &validation).map_err(|e| {
            AuthError::InvalidToken {
                service: self.config.name.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(data.claims)
    }
}
