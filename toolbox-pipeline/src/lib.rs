//! The invocation pipeline shared by the REST and MCP transports (§4.5).

pub mod pipeline;

pub use pipeline::{InvokeRequest, Pipeline};
