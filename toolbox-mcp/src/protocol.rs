//! JSON-RPC 2.0 envelope (§4.9, §6 "MCP protocol").

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// An inbound JSON-RPC 2.0 request or notification. Notifications (no `id`)
/// are valid input but the caller never emits a response for them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outbound JSON-RPC 2.0 response: exactly one of `result`/`error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(-32601, format!("Method not found: {method}"))
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(-32602, details)
    }

    pub fn internal_error(details: impl Into<String>) -> Self {
        Self::new(-32603, details)
    }

    /// Map a core error (§7) onto the nearest JSON-RPC code. Tool-invocation
    /// failures from `tools/call` are carried as `isError:true` content
    /// instead (§4.9), so this is only reached for protocol-level failures:
    /// bad params, unknown method, or an error surfacing before dispatch.
    pub fn from_toolbox_error(err: &toolbox_core::ToolboxError) -> Self {
        use toolbox_core::ErrorCategory;
        match err.category() {
            ErrorCategory::InvalidParameter => Self::invalid_params(err.to_string()),
            ErrorCategory::UnknownTool | ErrorCategory::UnknownToolset => {
                Self::method_not_found(&err.to_string())
            }
            ErrorCategory::Unauthorized => Self::new(-32001, err.to_string()),
            _ => Self::internal_error(err.to_string()),
        }
    }
}
