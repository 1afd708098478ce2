//! Source kind registry and the source map produced from it (§4.1, §4.2).

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use toolbox_core::Result;
use toolbox_interfaces::Source;

use crate::kind_registry::KindRegistry;

/// Decodes a `sources.<name>` YAML entry of one `kind` into a live `Source`.
///
/// Implementations are external collaborators (concrete backend drivers); this
/// crate only defines the seam they plug into.
pub trait SourceFactory: Send + Sync {
    /// The `kind` tag this factory handles, e.g. `"postgres"`, `"bigquery"`.
    fn kind(&self) -> &'static str;

    /// Decode `raw` (the strict-YAML-as-JSON entry, unknown fields already
    /// rejected by the caller) and open the backend connection or client.
    fn build(&self, name: &str, raw: &Value) -> Result<Arc<dyn Source>>;
}

/// Process-wide registry of source kinds.
pub type SourceRegistry = KindRegistry<dyn SourceFactory>;

/// The loaded `sources` map, insertion-ordered for deterministic manifests.
pub type SourceMap = IndexMap<String, Arc<dyn Source>>;
