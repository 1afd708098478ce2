//! HTTP transport (§4.8, §4.9): REST tool invocation and MCP JSON-RPC over
//! HTTP/SSE, both dispatched through one [`toolbox_pipeline::Pipeline`].

pub mod app;
pub mod error;
pub mod mcp_routes;
pub mod rest;

pub use app::{build_router, AppState};
