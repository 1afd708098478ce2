//! JWKS fetch and cache, one per configured auth service (§4.4).
//!
//! A fetch failure at startup is fatal (the caller should abort config load);
//! a fetch failure during a background refresh is logged and the last good
//! key set is retained (§4.4 error taxonomy).

use std::collections::HashMap;
use std::sync::RwLock;

use jsonwebtoken::DecodingKey;
use serde::Deserialize;

use crate::error::AuthError;

#[derive(Debug, Clone, Deserialize)]
struct RawJwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<RawJwk>,
}

#[derive(Debug, Clone)]
struct CachedKey {
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

impl CachedKey {
    fn to_decoding_key(&self, service: &str, kid: &str) -> Result<DecodingKey, AuthError> {
        match self.kty.as_str() {
            "RSA" => {
                let n = self.n.as_deref().ok_or_else(|| AuthError::UnsupportedKeyType {
                    service: service.to_string(),
                    kty: "RSA (missing n)".to_string(),
                })?;
                let e = self.e.as_deref().ok_or_else(|| AuthError::UnsupportedKeyType {
                    service: service.to_string(),
                    kty: "RSA (missing e)".to_string(),
                })?;
                DecodingKey::from_rsa_components(n, e).map_err(|_| AuthError::UnsupportedKeyType {
                    service: service.to_string(),
                    kty: "RSA (malformed components)".to_string(),
                })
            }
            other => Err(AuthError::UnsupportedKeyType {
                service: service.to_string(),
                kty: other.to_string(),
            }),
        }
    }
}

/// Cached JWKS for a single auth service, keyed by `kid`.
pub struct JwksCache {
    service: String,
    url: String,
    client: reqwest::Client,
    keys: RwLock<HashMap<String, CachedKey>>,
}

impl JwksCache {
    /// Fetch the JWKS once at construction. A failure here is meant to be
    /// treated as fatal by the caller (§4.4: "JWKS fetch failure at startup ->
    /// fatal").
    pub async fn new(service: impl Into<String>, url: impl Into<String>) -> Result<Self, AuthError> {
        let cache = Self {
            service: service.into(),
            url: url.into(),
            client: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
        };
        cache.refresh().await?;
        Ok(cache)
    }

    /// Re-fetch the JWKS document. On failure the previously cached keys are
    /// left untouched so verification of already-seen `kid`s keeps working.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let document = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| AuthError::JwksFetch {
                service: self.service.clone(),
                url: self.url.clone(),
                source,
            })?
            .error_for_status()
            .map_err(|source| AuthError::JwksFetch {
                service: self.service.clone(),
                url: self.url.clone(),
                source,
            })?
            .json::<JwksDocument>()
            .await
            .map_err(|source| AuthError::JwksFetch {
                service: self.service.clone(),
                url: self.url.clone(),
                source,
            })?;

        let mut fetched = HashMap::new();
        for jwk in document.keys {
            if let Some(kid) = jwk.kid {
                fetched.insert(
                    kid,
                    CachedKey {
                        kty: jwk.kty,
                        n: jwk.n,
                        e: jwk.e,
                    },
                );
            }
        }

        let mut keys = self.keys.write().expect("jwks cache lock poisoned");
        *keys = fetched;
        Ok(())
    }

    /// Look up the decoding key for `kid`, refreshing once if it isn't cached.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached_key(kid) {
            return key.to_decoding_key(&self.service, kid);
        }
        self.refresh().await?;
        self.cached_key(kid)
            .ok_or_else(|| AuthError::UnknownKeyId {
                service: self.service.clone(),
                kid: kid.to_string(),
            })?
            .to_decoding_key(&self.service, kid)
    }

    fn cached_key(&self, kid: &str) -> Option<CachedKey> {
        self.keys
            .read()
            .expect("jwks cache lock poisoned")
            .get(kid)
            .cloned()
    }
}
