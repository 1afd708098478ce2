//! End-to-end config loading: env substitution through to a fully wired
//! `LoadedConfig`, including the prebuilt-bundle selector (§4.2, §4.10).

use std::any::Any;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;

use toolbox_config::{ConfigLoader, ConfigError};
use toolbox_core::Result as ToolboxResult;
use toolbox_interfaces::{Capability, CapabilitySet, Source, Tool};
use toolbox_params::{ParamValues, Parameter};
use toolbox_registry::{
    default_auth_service_registry, AuthServiceRegistry, SourceFactory, SourceRegistry, ToolFactory,
    ToolRegistry,
};

const SQL_POOL: Capability = Capability::new("sql.pool");
const HTTP_CLIENT: Capability = Capability::new("http.client");

#[derive(Debug)]
struct StubSqlSource {
    name: String,
}

#[async_trait]
impl Source for StubSqlSource {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "stub-sql"
    }
    fn capabilities(&self) -> &CapabilitySet {
        static CAPS: OnceLock<CapabilitySet> = OnceLock::new();
        CAPS.get_or_init(|| CapabilitySet::new([SQL_POOL]))
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct StubHttpSource {
    name: String,
}

#[async_trait]
impl Source for StubHttpSource {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "stub-http"
    }
    fn capabilities(&self) -> &CapabilitySet {
        static CAPS: OnceLock<CapabilitySet> = OnceLock::new();
        CAPS.get_or_init(|| CapabilitySet::new([HTTP_CLIENT]))
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct StubTool {
    name: String,
    source_name: String,
    required: CapabilitySet,
    parameters: Vec<Parameter>,
    auth_required: Vec<String>,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "integration-test stub tool"
    }
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
    fn template_parameters(&self) -> &[Parameter] {
        &[]
    }
    fn auth_required(&self) -> &[String] {
        &self.auth_required
    }
    fn source_name(&self) -> &str {
        &self.source_name
    }
    fn required_capabilities(&self) -> &CapabilitySet {
        &self.required
    }
    async fn invoke(
        &self,
        _source: &dyn Source,
        _params: &ParamValues,
        _expanded_template: Option<&str>,
    ) -> ToolboxResult<Value> {
        Ok(Value::Null)
    }
}

struct StubSqlSourceFactory;
impl SourceFactory for StubSqlSourceFactory {
    fn kind(&self) -> &'static str {
        "stub-sql"
    }
    fn build(&self, name: &str, _raw: &Value) -> ToolboxResult<Arc<dyn Source>> {
        Ok(Arc::new(StubSqlSource { name: name.to_string() }))
    }
}

struct StubHttpSourceFactory;
impl SourceFactory for StubHttpSourceFactory {
    fn kind(&self) -> &'static str {
        "stub-http"
    }
    fn build(&self, name: &str, _raw: &Value) -> ToolboxResult<Arc<dyn Source>> {
        Ok(Arc::new(StubHttpSource { name: name.to_string() }))
    }
}

struct StubSqlToolFactory;
impl ToolFactory for StubSqlToolFactory {
    fn kind(&self) -> &'static str {
        "stub-sql"
    }
    fn build(&self, name: &str, raw: &Value, _source: Arc<dyn Source>) -> ToolboxResult<Arc<dyn Tool>> {
        Ok(Arc::new(StubTool {
            name: name.to_string(),
            source_name: raw["source"].as_str().unwrap().to_string(),
            required: CapabilitySet::new([SQL_POOL]),
            parameters: vec![],
            auth_required: vec![],
        }))
    }
}

struct StubHttpToolFactory;
impl ToolFactory for StubHttpToolFactory {
    fn kind(&self) -> &'static str {
        "stub-http"
    }
    fn build(&self, name: &str, raw: &Value, _source: Arc<dyn Source>) -> ToolboxResult<Arc<dyn Tool>> {
        Ok(Arc::new(StubTool {
            name: name.to_string(),
            source_name: raw["source"].as_str().unwrap().to_string(),
            required: CapabilitySet::new([HTTP_CLIENT]),
            parameters: vec![],
            auth_required: vec![],
        }))
    }
}

fn loader() -> ConfigLoader {
    let sources: Arc<SourceRegistry> = Arc::new(SourceRegistry::new("source"));
    sources.register("stub-sql", Arc::new(StubSqlSourceFactory));
    sources.register("stub-http", Arc::new(StubHttpSourceFactory));

    let tools: Arc<ToolRegistry> = Arc::new(ToolRegistry::new("tool"));
    tools.register("stub-sql", Arc::new(StubSqlToolFactory));
    tools.register("stub-http", Arc::new(StubHttpToolFactory));

    let auth: Arc<AuthServiceRegistry> = Arc::new(default_auth_service_registry());

    ConfigLoader::new(sources, tools, auth)
}

#[tokio::test]
async fn demo_postgres_prebuilt_loads_end_to_end() {
    let yaml = toolbox_config::prebuilt::lookup("demo-postgres").unwrap();
    let loaded = loader().load_str(yaml).await.unwrap();

    assert!(loaded.sources.contains_key("demo_db"));
    assert!(loaded.tools.contains_key("list_tables"));
    assert_eq!(
        loaded.toolset_tool_names("").unwrap(),
        &["list_tables".to_string()]
    );
    let manifest = loaded.manifests.get("").unwrap();
    assert_eq!(manifest.mcp["tools"][0]["name"], "list_tables");
}

#[tokio::test]
async fn demo_http_prebuilt_loads_end_to_end() {
    let yaml = toolbox_config::prebuilt::lookup("demo-http").unwrap();
    let loaded = loader().load_str(yaml).await.unwrap();

    assert!(loaded.sources.contains_key("demo_api"));
    assert!(loaded.tools.contains_key("ping_api"));
}

#[tokio::test]
async fn unknown_prebuilt_name_does_not_reach_the_loader() {
    let err = toolbox_config::prebuilt::lookup("nonexistent").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownPrebuilt { .. }));
}

#[tokio::test]
async fn toolsets_and_capability_mismatch_are_enforced_together() {
    let yaml = r#"
sources:
  db:
    kind: stub-sql
  api:
    kind: stub-http
tools:
  list_tables:
    kind: stub-sql
    source: db
  ping_api:
    kind: stub-http
    source: api
toolsets:
  sql_only: [list_tables]
"#;
    let loaded = loader().load_str(yaml).await.unwrap();
    assert_eq!(
        loaded.toolset_tool_names("sql_only").unwrap(),
        &["list_tables".to_string()]
    );
    assert_eq!(loaded.toolset_tool_names("").unwrap().len(), 2);

    // Swapping the tool kind onto the wrong source surfaces a config error
    // naming the tool, rather than deferring to an invocation-time downcast.
    let mismatched = r#"
sources:
  api:
    kind: stub-http
tools:
  list_tables:
    kind: stub-sql
    source: api
"#;
    let err = loader().load_str(mismatched).await.unwrap_err();
    match err {
        ConfigError::Toolbox(inner) => assert!(inner.to_string().contains("list_tables")),
        other => panic!("expected a capability-mismatch Toolbox error, got {other:?}"),
    }
}

#[tokio::test]
async fn env_substitution_runs_before_yaml_parsing() {
    let yaml = "sources:\n  db:\n    kind: stub-sql\n    host: ${TOOLBOX_TEST_HOST:fallback-host}\n";
    let loaded = loader().load_str(yaml).await.unwrap();
    assert!(loaded.sources.contains_key("db"));
}
