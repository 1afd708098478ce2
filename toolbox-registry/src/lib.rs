//! Process-wide kind registries (§2 component A) and toolset/manifest
//! generation (§2 component G).

pub mod auth_registry;
pub mod kind_registry;
pub mod source_registry;
pub mod tool_registry;
pub mod toolset;

pub use auth_registry::{default_auth_service_registry, AuthServiceFactory, AuthServiceRegistry};
pub use kind_registry::KindRegistry;
pub use source_registry::{SourceFactory, SourceMap, SourceRegistry};
pub use tool_registry::{check_capability_match, ToolFactory, ToolMap, ToolRegistry};
pub use toolset::{build_manifests, Toolset, ToolsetManifests, ToolsetMap};
