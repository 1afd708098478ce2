//! The `Source` interface (§4.2 Source, §4.6 capability matching).
//!
//! A `Source` is an opaque runtime handle owning exactly one connection pool or
//! client for the lifetime of the process. The core never downcasts a `Source`
//! to a concrete backend type itself; it only checks the capability set a
//! source publishes against the set a tool requires (§4.6). A tool kind that
//! needs the concrete handle (a SQL pool, a BigQuery client, ...) downcasts via
//! `as_any` once the capability check has already passed at config-load time —
//! that downcast lives in the tool kind, an external collaborator, not here.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use toolbox_core::Result;

use crate::capability::CapabilitySet;

/// Live handle to one configured backend.
#[async_trait]
pub trait Source: Send + Sync + fmt::Debug {
    /// The name this source was declared under in the config's `sources` map.
    fn name(&self) -> &str;

    /// The `kind` tag this source was decoded from, e.g. `"postgres"`, `"bigquery"`.
    fn kind(&self) -> &str;

    /// Capabilities this source publishes for tool-source matching (§4.6).
    fn capabilities(&self) -> &CapabilitySet;

    /// Narrow downcast to the concrete backend handle a tool kind expects.
    /// Only called after `capabilities()` has already confirmed compatibility.
    fn as_any(&self) -> &dyn Any;

    /// Liveness probe used by the server's readiness surface; sources with no
    /// meaningful liveness concept (e.g. a stateless HTTP client) may no-op.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Release the source's connection pool or client. Called once at shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
