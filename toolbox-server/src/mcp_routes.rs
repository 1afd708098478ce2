//! MCP HTTP/SSE transport (§4.9).
//!
//! `POST /mcp` opens a session (on `initialize`) or dispatches a JSON-RPC
//! request against an existing one; `GET /mcp?sessionId=…` streams the
//! session's event queue as Server-Sent Events, honoring `Last-Event-Id` for
//! resumable reconnects.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::stream::Stream;
use serde::Deserialize;
use serde_json::json;

use toolbox_mcp::protocol::{JsonRpcError, JsonRpcResponse};
use toolbox_mcp::JsonRpcRequest;

use crate::app::AppState;

const SESSION_HEADER: &str = "Mcp-Session-Id";
const LAST_EVENT_ID_HEADER: &str = "last-event-id";
/// How often the SSE loop checks the session buffer for new events. MCP
/// sessions are request-driven, not push-heavy, so short polling is simpler
/// than wiring a broadcast channel through `Session` for this volume (§4.9).
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
pub struct McpQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    /// Toolset a brand-new session is addressed at; defaults to the implicit
    /// `""` toolset (§4.7) when omitted.
    toolset: Option<String>,
}

/// `POST /mcp` / `POST /mcp/v1` (§4.9).
pub async fn mcp_post(
    State(state): State<AppState>,
    Query(query): Query<McpQuery>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let session = match &query.session_id {
        Some(id) => match state.sessions.get(id) {
            Some(session) => session,
            None => {
                let error = JsonRpcError::invalid_params(format!("unknown session '{id}'"));
                return Json(JsonRpcResponse::failure(request.id.clone(), error)).into_response();
            }
        },
        None => state.sessions.create(query.toolset.clone().unwrap_or_default()),
    };

    let response = state.mcp.handle(&session, &request, &headers).await;
    let Some(response) = response else {
        return axum::http::StatusCode::ACCEPTED.into_response();
    };

    session.push_event("response", json!(response));

    let mut http_response = Json(response).into_response();
    if let Ok(value) = session.id.parse() {
        http_response.headers_mut().insert(SESSION_HEADER, value);
    }
    http_response
}

/// `GET /mcp` / `GET /mcp/v1` (§4.9): SSE stream of the session's events,
/// replaying from `Last-Event-Id` when present (§4.9, §8 scenario S4).
pub async fn mcp_sse(
    State(state): State<AppState>,
    Query(query): Query<McpQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(session_id) = query.session_id else {
        return axum::http::StatusCode::BAD_REQUEST.into_response();
    };
    let Some(session) = state.sessions.get(&session_id) else {
        return axum::http::StatusCode::NOT_FOUND.into_response();
    };

    let last_event_id = headers
        .get(LAST_EVENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let stream = event_stream(session, last_event_id);
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive"))
        .into_response()
}

fn event_stream(
    session: std::sync::Arc<toolbox_mcp::Session>,
    last_event_id: Option<u64>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let mut cursor = last_event_id;
        for buffered in session.events_since(cursor) {
            cursor = Some(buffered.id);
            yield Ok(sse_event(&buffered));
        }

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            if session.state() == toolbox_mcp::SessionState::Closed {
                return;
            }
            for buffered in session.events_since(cursor) {
                cursor = Some(buffered.id);
                yield Ok(sse_event(&buffered));
            }
        }
    }
}

fn sse_event(buffered: &toolbox_mcp::BufferedEvent) -> Event {
    let mut data = buffered.data.clone();
    if buffered.resumed == Some(false) {
        if let Some(obj) = data.as_object_mut() {
            obj.insert("resumed".to_string(), json!(false));
        }
    }
    Event::default()
        .id(buffered.id.to_string())
        .event(buffered.event.clone())
        .data(data.to_string())
}
