//! The invocation pipeline (§4.5): the seven steps every REST and MCP request
//! runs through, in order, regardless of transport.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use serde_json::Value;

use toolbox_auth::AuthManager;
use toolbox_core::{InvocationCounters, Result as ToolboxResult, ToolboxError};
use toolbox_interfaces::{Source, Tool};
use toolbox_params::{expand_template, resolve_all};
use toolbox_registry::{SourceMap, ToolMap, Toolset};

/// A request addressed at one tool within one toolset, independent of whatever
/// transport (REST, MCP) produced it.
pub struct InvokeRequest<'a> {
    /// Toolset name; `""` addresses the implicit all-tools toolset (§4.7).
    pub toolset: &'a str,
    pub tool: &'a str,
    /// Request body; non-object bodies are treated as supplying no parameters.
    pub body: &'a Value,
    pub headers: &'a HeaderMap,
    /// Request-level timeout override (e.g. a transport-parsed header), if any
    /// (§5 "earliest wins"). `None` falls back to the pipeline's default.
    pub deadline: Option<Duration>,
}

/// The shared runtime every transport calls through (§4.5).
///
/// Stateless above the sources it holds: any number of invocations run
/// concurrently, limited only by each source's own pool. Cancellation is not
/// modeled explicitly here — dropping the future returned by [`Pipeline::invoke`]
/// (as a transport does when its client disconnects) drops the in-flight
/// `Tool::invoke` call with it, which is what propagates cancellation to the
/// backend call (§4.5, §5 "Cancellation").
pub struct Pipeline {
    sources: SourceMap,
    tools: ToolMap,
    toolsets: indexmap::IndexMap<String, Toolset>,
    auth: AuthManager,
    counters: InvocationCounters,
    default_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        sources: SourceMap,
        tools: ToolMap,
        toolsets: indexmap::IndexMap<String, Toolset>,
        auth: AuthManager,
    ) -> Self {
        Self {
            sources,
            tools,
            toolsets,
            auth,
            counters: InvocationCounters::new(),
            default_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn counters(&self) -> &InvocationCounters {
        &self.counters
    }

    pub fn toolset_tool_names(&self, toolset: &str) -> Option<&[String]> {
        self.toolsets.get(toolset).map(|t| t.tool_names.as_slice())
    }

    /// Run the full §4.5 pipeline for one request: resolve, authorize, parse
    /// parameters, expand templates, invoke, and return the (already
    /// normalized by the tool kind) result. Exactly one success or failure
    /// counter is recorded, and exactly one log record is emitted on failure.
    pub async fn invoke(&self, request: InvokeRequest<'_>) -> ToolboxResult<Value> {
        let result = self.invoke_inner(&request).await;
        match &result {
            Ok(_) => self.counters.record_success(request.tool),
            Err(err) => {
                err.log(request.tool);
                self.counters.record_failure(request.tool, err.category());
            }
        }
        result
    }

    async fn invoke_inner(&self, request: &InvokeRequest<'_>) -> ToolboxResult<Value> {
        // 1. Resolve: the tool must be a member of the addressed toolset, and
        // the toolset itself must exist.
        let toolset = self
            .toolsets
            .get(request.toolset)
            .ok_or_else(|| ToolboxError::UnknownToolset(request.toolset.to_string()))?;
        if !toolset.tool_names.iter().any(|name| name == request.tool) {
            return Err(ToolboxError::UnknownTool(request.tool.to_string()));
        }
        let tool = self
            .tools
            .get(request.tool)
            .ok_or_else(|| ToolboxError::UnknownTool(request.tool.to_string()))?;
        let source = self.tools_source(tool.source_name())?;

        // 2. Authorize.
        let claims = self.auth.authenticate_headers(request.headers).await?;
        self.auth
            .authorize(tool.auth_required(), &claims.verified_services())?;

        // 3. Parse parameters, rejecting extraneous body keys up front.
        reject_extraneous_keys(tool.as_ref(), request.body)?;
        let resolved = resolve_all(tool.parameters(), request.body, &claims)?;
        let resolved_template = resolve_all(tool.template_parameters(), request.body, &claims)?;

        // 4. Template expansion.
        let expanded = match tool.template_text() {
            Some(text) => Some(expand_template(text, tool.template_parameters(), &resolved_template)?),
            None => None,
        };

        // 5. Invoke, under the earliest of the request's deadline and the
        // pipeline's default (§5 "Timeouts").
        let deadline = request
            .deadline
            .map(|d| d.min(self.default_timeout))
            .unwrap_or(self.default_timeout);
        let invocation = tool.invoke(source.as_ref(), &resolved, expanded.as_deref());
        let value = match tokio::time::timeout(deadline, invocation).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ToolboxError::Backend(toolbox_core::BackendError::DeadlineExceeded(
                    format!("tool '{}' exceeded its {:?} deadline", tool.name(), deadline),
                )))
            }
        };

        // 6. Normalize: tool kinds already return a JSON-serializable value
        // shaped through `toolbox_core::normalize` (rows, decimals, byte
        // strings); the pipeline only passes it through.
        // 7. Emit: handled by the caller's transport.
        Ok(value)
    }

    fn tools_source(&self, source_name: &str) -> ToolboxResult<Arc<dyn Source>> {
        self.sources
            .get(source_name)
            .cloned()
            .ok_or_else(|| ToolboxError::Internal(format!("tool references unknown source '{source_name}'")))
    }
}

/// Reject any top-level body key that names neither a standard nor a
/// template-lane parameter (§4.5 step 3: "extraneous keys in the body are
/// rejected").
fn reject_extraneous_keys(tool: &dyn Tool, body: &Value) -> ToolboxResult<()> {
    let Some(obj) = body.as_object() else {
        return Ok(());
    };
    let known: HashSet<&str> = tool
        .parameters()
        .iter()
        .chain(tool.template_parameters())
        .map(|p| p.name.as_str())
        .collect();
    for key in obj.keys() {
        if !known.contains(key.as_str()) {
            return Err(ToolboxError::InvalidParameter(format!(
                "unknown parameter '{key}' for tool '{}'",
                tool.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
