//! Aggregates every configured auth service's verifier and authorizes tool
//! invocations against `authRequired` (§4.4, §4.5 rule: "authorize").

use std::collections::HashMap;

use http::HeaderMap;

use toolbox_params::VerifiedClaims;

use crate::error::AuthError;
use crate::verifier::AuthServiceVerifier;

/// The header a caller supplies a service's bearer token under, e.g.
/// `google_token` for an auth service named `google` (§4.4, §6).
pub fn token_header_name(service: &str) -> String {
    format!("{service}_token")
}

fn strip_bearer_prefix(raw: &str) -> &str {
    raw.strip_prefix("Bearer ").unwrap_or(raw)
}

/// Owns every configured `AuthServiceVerifier` and turns a request's bearer
/// tokens into a `VerifiedClaims` set threaded to the parameter resolver.
pub struct AuthManager {
    verifiers: HashMap<String, AuthServiceVerifier>,
}

impl AuthManager {
    pub fn new(verifiers: Vec<AuthServiceVerifier>) -> Self {
        Self {
            verifiers: verifiers.into_iter().map(|v| (v.name().to_string(), v)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.verifiers.contains_key(service)
    }

    /// Verify every auth-service token present in `headers`, by the
    /// `<service>_token` convention. Services for which no header was supplied
    /// are simply absent from the returned claim set; an invalid token that
    /// *was* supplied is a hard failure (§4.4: "token present but invalid ->
    /// 401").
    pub async fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<VerifiedClaims, AuthError> {
        let mut claims = VerifiedClaims::new();
        for (name, verifier) in &self.verifiers {
            let header_name = token_header_name(name);
            let Some(raw) = headers.get(&header_name) else {
                continue;
            };
            let raw = raw.to_str().map_err(|_| AuthError::InvalidToken {
                service: name.clone(),
                reason: "token header is not valid UTF-8".to_string(),
            })?;
            let token = strip_bearer_prefix(raw.trim());
            let verified = verifier.verify(token).await?;
            claims.insert(name.clone(), verified);
        }
        Ok(claims)
    }

    /// Enforce a tool's `authRequired` list against the set of service names
    /// that successfully verified (§4.5 rule 2, §7 "unauthorized").
    pub fn authorize(&self, required: &[String], verified_services: &[String]) -> Result<(), AuthError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|svc| !verified_services.contains(svc))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::MissingRequiredServices { missing })
        }
    }
}
