//! Auth-service verifier errors (§4.4, §7 error taxonomy).

use thiserror::Error;
use toolbox_core::ToolboxError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth service '{0}' is not declared in the configuration")]
    UnknownService(String),

    #[error("no token supplied for auth service '{0}'")]
    MissingToken(String),

    #[error("token for auth service '{service}' is invalid: {reason}")]
    InvalidToken { service: String, reason: String },

    #[error("tool requires auth service(s) {missing:?} which the caller did not verify")]
    MissingRequiredServices { missing: Vec<String> },

    #[error("failed to fetch JWKS for auth service '{service}' from {url}: {source}")]
    JwksFetch {
        service: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("JWKS for auth service '{service}' has no usable key for kid '{kid}'")]
    UnknownKeyId { service: String, kid: String },

    #[error("JWKS for auth service '{service}' contains an unsupported key type '{kty}'")]
    UnsupportedKeyType { service: String, kty: String },
}

impl From<AuthError> for ToolboxError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::MissingToken(_)
            | AuthError::InvalidToken { .. }
            | AuthError::MissingRequiredServices { .. } => {
                ToolboxError::Unauthorized(err.to_string())
            }
            // A presented token with a `kid`/`kty` the JWKS doesn't cover is a
            // present-but-unverifiable token, not a config problem (§4.4) — the
            // genuine fetch-failure case is still fatal at startup via UnknownService/JwksFetch.
            AuthError::UnknownKeyId { .. } | AuthError::UnsupportedKeyType { .. } => {
                ToolboxError::Unauthorized(err.to_string())
            }
            AuthError::UnknownService(_) | AuthError::JwksFetch { .. } => {
                ToolboxError::Config(err.to_string())
            }
        }
    }
}
