//! Core error taxonomy shared by every transport and component.
//!
//! Every failure in the runtime is funneled through [`ToolboxError`] so the HTTP and
//! MCP transports never have to invent their own status-code mapping; they just call
//! [`ToolboxError::http_status`] / [`ToolboxError::error_code`].

use thiserror::Error;

/// Top-level error type for the tool-dispatch runtime.
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// Schema, reference, or collision error while loading configuration. Fatal at
    /// startup; never raised mid-request.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or invalid token for a required auth service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Parameter parse, type, cardinality, or allow-list failure.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Tool name did not resolve within the addressed toolset.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Toolset name did not resolve.
    #[error("unknown toolset: {0}")]
    UnknownToolset(String),

    /// Error surfaced by a source's backend driver.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Unexpected failure inside the core itself.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Sub-categories for errors originating in a backend driver (§7).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal backend error: {0}")]
    Internal(String),
}

/// Result alias used throughout the runtime.
pub type Result<T> = std::result::Result<T, ToolboxError>;

/// The §7 error category, used for log fields and metric tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Config,
    Unauthorized,
    InvalidParameter,
    UnknownTool,
    UnknownToolset,
    Backend,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Unauthorized => "unauthorized",
            Self::InvalidParameter => "invalid-parameter",
            Self::UnknownTool => "unknown-tool",
            Self::UnknownToolset => "unknown-toolset",
            Self::Backend => "backend",
            Self::Internal => "internal",
        }
    }
}

impl ToolboxError {
    /// The §7 category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Unauthorized(_) => ErrorCategory::Unauthorized,
            Self::InvalidParameter(_) => ErrorCategory::InvalidParameter,
            Self::UnknownTool(_) => ErrorCategory::UnknownTool,
            Self::UnknownToolset(_) => ErrorCategory::UnknownToolset,
            Self::Backend(_) => ErrorCategory::Backend,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// A short machine-readable code, stable across releases.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::UnknownTool(_) => "UNKNOWN_TOOL",
            Self::UnknownToolset(_) => "UNKNOWN_TOOLSET",
            Self::Backend(BackendError::DeadlineExceeded(_)) => "BACKEND_DEADLINE_EXCEEDED",
            Self::Backend(BackendError::Unavailable(_)) => "BACKEND_UNAVAILABLE",
            Self::Backend(BackendError::PermissionDenied(_)) => "BACKEND_PERMISSION_DENIED",
            Self::Backend(BackendError::NotFound(_)) => "BACKEND_NOT_FOUND",
            Self::Backend(BackendError::InvalidArgument(_)) => "BACKEND_INVALID_ARGUMENT",
            Self::Backend(BackendError::Internal(_)) => "BACKEND_INTERNAL",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code the REST transport should answer with (§4.8).
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Unauthorized(_) => 401,
            Self::InvalidParameter(_) => 400,
            Self::UnknownTool(_) | Self::UnknownToolset(_) => 404,
            Self::Backend(BackendError::Unavailable(_)) => 503,
            Self::Backend(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Whether the core should log this at `warn` (client error) or `error` (the rest).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Unauthorized
                | ErrorCategory::InvalidParameter
                | ErrorCategory::UnknownTool
                | ErrorCategory::UnknownToolset
        )
    }

    /// Log this error at the level §7 mandates, with the one structured record it
    /// promises: exactly one `warn` or `error` per failed invocation.
    pub fn log(&self, tool_name: &str) {
        if self.is_client_error() {
            tracing::warn!(
                tool = tool_name,
                category = self.category().as_str(),
                error_code = self.error_code(),
                message = %self,
                "invocation failed"
            );
        } else {
            tracing::error!(
                tool = tool_name,
                category = self.category().as_str(),
                error_code = self.error_code(),
                message = %self,
                "invocation failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(ToolboxError::Unauthorized("x".into()).http_status(), 401);
        assert_eq!(ToolboxError::InvalidParameter("x".into()).http_status(), 400);
        assert_eq!(ToolboxError::UnknownTool("x".into()).http_status(), 404);
        assert_eq!(ToolboxError::UnknownToolset("x".into()).http_status(), 404);
    }

    #[test]
    fn backend_unavailable_maps_to_503() {
        let err = ToolboxError::Backend(BackendError::Unavailable("pool exhausted".into()));
        assert_eq!(err.http_status(), 503);
        assert!(!err.is_client_error());
    }

    #[test]
    fn client_vs_backend_error_classification() {
        assert!(ToolboxError::InvalidParameter("x".into()).is_client_error());
        assert!(!ToolboxError::Internal("x".into()).is_client_error());
    }
}
