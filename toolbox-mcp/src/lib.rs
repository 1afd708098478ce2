//! Model Context Protocol transport (§4.9): JSON-RPC 2.0 carried over stdio
//! or HTTP/SSE, dispatched through the same [`toolbox_pipeline::Pipeline`]
//! the REST transport uses.

pub mod handler;
pub mod manager;
pub mod protocol;
pub mod session;
pub mod stdio;

pub use handler::McpHandler;
pub use manager::SessionManager;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use session::{BufferedEvent, Session, SessionState};
