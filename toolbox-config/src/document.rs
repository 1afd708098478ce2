//! The loaded, fully cross-validated configuration (§3 Data Model).

use indexmap::IndexMap;

use toolbox_auth::AuthManager;
use toolbox_registry::{SourceMap, Toolset, ToolsetManifests, ToolMap};

/// Everything a server process needs after config load: live sources, resolved
/// tools, declared toolsets (plus the implicit `""` one) with their cached
/// manifests, and the auth manager built from every configured auth service.
pub struct LoadedConfig {
    pub sources: SourceMap,
    pub tools: ToolMap,
    pub toolsets: IndexMap<String, Toolset>,
    pub manifests: IndexMap<String, ToolsetManifests>,
    pub auth: AuthManager,
}

impl LoadedConfig {
    /// Look up a declared toolset's tool-name list, or the implicit `""`
    /// toolset (every loaded tool) when `name` is empty (§3, §4.7).
    pub fn toolset_tool_names(&self, name: &str) -> Option<&[String]> {
        self.toolsets.get(name).map(|t| t.tool_names.as_slice())
    }
}
