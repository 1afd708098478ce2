//! Core error taxonomy, result normalization, and invocation counters shared by
//! every crate in the toolbox tool-dispatch runtime.

pub mod error;
pub mod metrics;
pub mod normalize;

pub use error::{BackendError, ErrorCategory, Result, ToolboxError};
pub use metrics::InvocationCounters;
pub use normalize::{normalize, normalize_rows, RawValue};
