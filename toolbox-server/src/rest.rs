//! Plain HTTP/JSON transport (§4.8).
//!
//! - `GET /api/toolset[/{name}]` → native manifest.
//! - `POST /api/tool/{name}/invoke` → runs the invocation pipeline.
//! - `GET /debug/metrics` → in-process counter snapshot (§A.1), test/debug only.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use toolbox_core::ToolboxError;
use toolbox_pipeline::InvokeRequest;

use crate::app::AppState;
use crate::error::ApiError;

pub async fn root() -> &'static str {
    "toolbox"
}

/// `GET /api/toolset` — the implicit `""` toolset's native manifest.
pub async fn list_toolset(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    get_toolset(State(state), Path(String::new())).await
}

/// `GET /api/toolset/{name}` — a named toolset's native manifest (§4.7).
pub async fn get_toolset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let manifests = state
        .toolsets
        .get(&name)
        .ok_or_else(|| ToolboxError::UnknownToolset(name.clone()))?;
    Ok(Json(manifests.native.clone()))
}

/// `POST /api/tool/{name}/invoke` — runs the §4.5 invocation pipeline against
/// the implicit `""` toolset (§4.8: every tool is reachable without naming a
/// toolset over REST).
pub async fn invoke_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let request = InvokeRequest {
        toolset: "",
        tool: &name,
        body: &body,
        headers: &headers,
        deadline: None,
    };
    match state.pipeline.invoke(request).await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// `GET /debug/metrics` — counter snapshot for tests and local debugging
/// (§A.1); no external exporter is wired.
pub async fn debug_metrics(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.pipeline.counters().snapshot();
    Json(json!({
        "counters": snapshot
            .into_iter()
            .map(|(tool, outcome, count)| json!({"tool": tool, "outcome": outcome, "count": count}))
            .collect::<Vec<_>>()
    }))
}
