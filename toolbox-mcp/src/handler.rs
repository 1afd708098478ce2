//! JSON-RPC method dispatch shared by the stdio and HTTP/SSE transports
//! (§4.9: "Two transports share one handler").
//!
//! Methods implemented: `initialize`, `tools/list`, `tools/call`, `ping`.
//! Everything else comes back as `-32601 Method not found`.

use std::sync::Arc;

use http::HeaderMap;
use serde::Deserialize;
use serde_json::{json, Value};

use toolbox_pipeline::{InvokeRequest, Pipeline};
use toolbox_registry::ToolsetMap;

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::session::{Session, SessionState};

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(default)]
    #[allow(dead_code)]
    protocol_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Dispatches JSON-RPC requests against a [`Pipeline`], shared by both
/// transports (§4.9).
pub struct McpHandler {
    pipeline: Arc<Pipeline>,
    toolsets: Arc<ToolsetMap>,
}

impl McpHandler {
    pub fn new(pipeline: Arc<Pipeline>, toolsets: Arc<ToolsetMap>) -> Self {
        Self { pipeline, toolsets }
    }

    /// Handle one JSON-RPC request against `session`. Returns `None` for
    /// notifications, which never get a response (§6).
    pub async fn handle(
        &self,
        session: &Session,
        request: &JsonRpcRequest,
        headers: &HeaderMap,
    ) -> Option<JsonRpcResponse> {
        session.touch();

        if !session.allows(&request.method) {
            if request.is_notification() {
                return None;
            }
            let error = if session.state() == SessionState::Closed {
                JsonRpcError::internal_error("session is closed")
            } else {
                JsonRpcError::invalid_params("session must be initialized first")
            };
            return Some(JsonRpcResponse::failure(request.id.clone(), error));
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(session, request.params.clone()),
            "tools/list" => self.handle_tools_list(session),
            "tools/call" => self.handle_tools_call(session, request.params.clone(), headers).await,
            "ping" => Ok(json!({})),
            other => Err(JsonRpcError::method_not_found(other)),
        };

        if request.is_notification() {
            return None;
        }
        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(error) => JsonRpcResponse::failure(request.id.clone(), error),
        })
    }

    fn handle_initialize(&self, session: &Session, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if let Some(params) = params {
            let _: InitializeParams =
                serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;
        }
        if !self.toolsets.contains_key(&session.toolset) {
            return Err(JsonRpcError::invalid_params(format!(
                "unknown toolset '{}'",
                session.toolset
            )));
        }
        session.transition(SessionState::Initialized);
        Ok(json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": { "name": "toolbox", "version": env!("CARGO_PKG_VERSION") },
            "capabilities": { "tools": {} },
        }))
    }

    fn handle_tools_list(&self, session: &Session) -> Result<Value, JsonRpcError> {
        let manifests = self
            .toolsets
            .get(&session.toolset)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("unknown toolset '{}'", session.toolset)))?;
        Ok(manifests.mcp.clone())
    }

    async fn handle_tools_call(
        &self,
        session: &Session,
        params: Option<Value>,
        headers: &HeaderMap,
    ) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
        let call: ToolsCallParams =
            serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;

        let request = InvokeRequest {
            toolset: &session.toolset,
            tool: &call.name,
            body: &call.arguments,
            headers,
            deadline: None,
        };

        match self.pipeline.invoke(request).await {
            Ok(value) => Ok(json!({
                "content": [{ "type": "text", "text": value.to_string() }],
                "isError": false,
            })),
            // An unknown tool/toolset never reached invocation, so it is a
            // protocol-level failure, not a tool result (§4.9).
            Err(err)
                if matches!(
                    err.category(),
                    toolbox_core::ErrorCategory::UnknownTool | toolbox_core::ErrorCategory::UnknownToolset
                ) =>
            {
                Err(JsonRpcError::from_toolbox_error(&err))
            }
            Err(err) => Ok(json!({
                "content": [{ "type": "text", "text": err.to_string() }],
                "isError": true,
            })),
        }
    }
}
