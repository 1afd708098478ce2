//! Line-delimited JSON-RPC over stdin/stdout (§4.9 "stdio transport").
//!
//! One implicit session addressed at the toolset the process was started
//! with, already `Initialized` so a client can send `tools/list`/`tools/call`
//! directly — stdio has no separate initialize handshake at the transport
//! level, unlike HTTP/SSE where `initialize` opens the session.

use std::sync::Arc;

use http::HeaderMap;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::handler::McpHandler;
use crate::protocol::JsonRpcRequest;
use crate::session::{Session, SessionState};

/// Read JSON-RPC requests one per line from `stdin` until EOF, dispatch each
/// through `handler`, and write responses one per line to `stdout`.
pub async fn serve(handler: Arc<McpHandler>, toolset: impl Into<String>) -> io::Result<()> {
    let session = Session::new("stdio", toolset);
    session.transition(SessionState::Initialized);
    let headers = HeaderMap::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => handler.handle(&session, &request, &headers).await,
            Err(_) => Some(crate::protocol::JsonRpcResponse::failure(
                None,
                crate::protocol::JsonRpcError::parse_error(),
            )),
        };
        if let Some(response) = response {
            let mut encoded = serde_json::to_string(&response).expect("JsonRpcResponse always serializes");
            encoded.push('\n');
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
