//! Parameter parsing and resolution errors (§4.3, §7 error taxonomy).

use thiserror::Error;
use toolbox_core::ToolboxError;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("parameter '{name}' is required but was not supplied")]
    Missing { name: String },

    #[error("parameter '{name}' expected type {expected}, got {actual}")]
    WrongType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("array parameter '{name}' element {index}: {source}")]
    ArrayElement {
        name: String,
        index: usize,
        #[source]
        source: Box<ParamError>,
    },

    #[error("map parameter '{name}' key '{key}' is not in its allow-list")]
    DisallowedKey { name: String, key: String },

    #[error("map parameter '{name}' value for key '{key}': {source}")]
    MapValue {
        name: String,
        key: String,
        #[source]
        source: Box<ParamError>,
    },

    #[error("client supplied a value for claim-bound parameter '{name}'")]
    ClaimBoundOverride { name: String },

    #[error("auth service '{service}' did not provide claim field '{field}' for parameter '{name}'")]
    MissingClaim {
        name: String,
        service: String,
        field: String,
    },

    #[error("template value for parameter '{name}' contains characters outside the safe identifier set")]
    UnsafeTemplateValue { name: String },
}

impl From<ParamError> for ToolboxError {
    fn from(err: ParamError) -> Self {
        ToolboxError::InvalidParameter(err.to_string())
    }
}
