//! Router assembly (§4.8, §4.9): REST and MCP HTTP/SSE routes sharing one
//! [`Pipeline`] and one cached toolset-manifest map.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use toolbox_mcp::{McpHandler, SessionManager};
use toolbox_pipeline::Pipeline;
use toolbox_registry::ToolsetMap;

use crate::{mcp_routes, rest};

/// Shared state every REST and MCP handler reads from.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub toolsets: Arc<ToolsetMap>,
    pub mcp: Arc<McpHandler>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, toolsets: Arc<ToolsetMap>) -> Self {
        let mcp = Arc::new(McpHandler::new(pipeline.clone(), toolsets.clone()));
        Self {
            pipeline,
            toolsets,
            mcp,
            sessions: Arc::new(SessionManager::new()),
        }
    }
}

/// Build the full router: `/`, the REST surface (§4.8), and the MCP
/// HTTP/SSE surface (§4.9), wrapped in the middleware stack the teacher
/// layers every transport with (tracing, CORS, request timeout).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(rest::root))
        .route("/api/toolset", get(rest::list_toolset))
        .route("/api/toolset/{name}", get(rest::get_toolset))
        .route("/api/tool/{name}/invoke", post(rest::invoke_tool))
        .route("/debug/metrics", get(rest::debug_metrics))
        .route("/mcp", post(mcp_routes::mcp_post))
        .route("/mcp", get(mcp_routes::mcp_sse))
        .route("/mcp/v1", post(mcp_routes::mcp_post))
        .route("/mcp/v1", get(mcp_routes::mcp_sse))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
