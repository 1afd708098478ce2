//! Tool kind registry and tool/source capability wire-up (§4.1, §4.3, §4.6).

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use toolbox_core::{Result, ToolboxError};
use toolbox_interfaces::{Source, Tool};

use crate::kind_registry::KindRegistry;

/// Decodes a `tools.<name>` YAML entry of one `kind` into a live `Tool`,
/// already resolved against its source.
///
/// Implementations are external collaborators. `build` is expected to call
/// [`check_capability_match`] against the resolved source before returning, so
/// that an incompatible pairing surfaces as a config error rather than an
/// invocation-time downcast failure (§4.6).
pub trait ToolFactory: Send + Sync {
    fn kind(&self) -> &'static str;

    fn build(&self, name: &str, raw: &Value, source: Arc<dyn Source>) -> Result<Arc<dyn Tool>>;
}

/// Process-wide registry of tool kinds.
pub type ToolRegistry = KindRegistry<dyn ToolFactory>;

/// The loaded `tools` map, insertion-ordered for deterministic manifests.
pub type ToolMap = IndexMap<String, Arc<dyn Tool>>;

/// Assert that `source` publishes every capability `tool` requires (§4.6).
///
/// Returns a config error naming both the tool and the capabilities the
/// source's kind does not provide, rather than deferring the mismatch to an
/// invocation-time downcast.
pub fn check_capability_match(tool: &dyn Tool, source: &dyn Source) -> Result<()> {
    let missing = source.capabilities().missing_from(tool.required_capabilities());
    if missing.is_empty() {
        Ok(())
    } else {
        let missing_names: Vec<&str> = missing.iter().map(|c| c.as_str()).collect();
        Err(ToolboxError::Config(format!(
            "tool '{}' requires capabilities {:?} which source '{}' (kind '{}') does not provide",
            tool.name(),
            missing_names,
            source.name(),
            source.kind(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbox_interfaces::{Capability, CapabilitySet};
    use toolbox_params::{ParamValues, Parameter};

    #[derive(Debug)]
    struct StubSource {
        name: String,
        capabilities: CapabilitySet,
    }

    #[async_trait::async_trait]
    impl Source for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> &str {
            "postgres"
        }

        fn capabilities(&self) -> &CapabilitySet {
            &self.capabilities
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct StubTool {
        name: String,
        required: CapabilitySet,
    }

    #[async_trait::async_trait]
    impl Tool for StubTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            ""
        }

        fn parameters(&self) -> &[Parameter] {
            &[]
        }

        fn template_parameters(&self) -> &[Parameter] {
            &[]
        }

        fn auth_required(&self) -> &[String] {
            &[]
        }

        fn source_name(&self) -> &str {
            "db"
        }

        fn required_capabilities(&self) -> &CapabilitySet {
            &self.required
        }

        async fn invoke(
            &self,
            _source: &dyn Source,
            _params: &ParamValues,
            _expanded_template: Option<&str>,
        ) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn matching_capability_is_accepted() {
        const SQL_POOL: Capability = Capability::new("sql.pool");
        let source = StubSource {
            name: "db".into(),
            capabilities: CapabilitySet::new([SQL_POOL]),
        };
        let tool = StubTool {
            name: "find_user".into(),
            required: CapabilitySet::new([SQL_POOL]),
        };
        assert!(check_capability_match(&tool, &source).is_ok());
    }

    #[test]
    fn missing_capability_is_a_config_error_naming_the_tool() {
        const BIGQUERY: Capability = Capability::new("bigquery.client");
        let source = StubSource {
            name: "db".into(),
            capabilities: CapabilitySet::default(),
        };
        let tool = StubTool {
            name: "find_user".into(),
            required: CapabilitySet::new([BIGQUERY]),
        };
        let err = check_capability_match(&tool, &source).unwrap_err();
        match err {
            ToolboxError::Config(msg) => assert!(msg.contains("find_user")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
