//! Demo `stub-sql`/`stub-http` kinds (§1 Non-goals: "concrete backend driver
//! code" is out of scope for the core). Registering these is what lets the
//! binary actually load a tools file and serve requests without depending on
//! a real backend crate; they mirror the fixtures `toolbox-config`'s
//! integration tests and the two prebuilt YAML bundles already assume.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;

use toolbox_core::Result as ToolboxResult;
use toolbox_interfaces::{Capability, CapabilitySet, Source, Tool};
use toolbox_params::{ParamValues, Parameter};
use toolbox_registry::{SourceFactory, SourceRegistry, ToolFactory, ToolRegistry};

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

/// A tool that reports the statement/URL it was declared with instead of
/// actually reaching a backend, so a demo config can be invoked end to end.
struct StubTool {
    name: String,
    source_name: String,
    required: CapabilitySet,
    parameters: Vec<Parameter>,
    auth_required: Vec<String>,
    echo_key: &'static str,
    echo_value: String,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "demo stub tool: echoes its declared statement/URL and resolved parameters"
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
        params: &ParamValues,
        _expanded_template: Option<&str>,
    ) -> ToolboxResult<Value> {
        let mut out = serde_json::Map::new();
        out.insert(self.echo_key.to_string(), Value::String(self.echo_value.clone()));
        let mut args = serde_json::Map::new();
        for entry in params.iter() {
            args.insert(entry.name.clone(), entry.value.to_json());
        }
        out.insert("parameters".to_string(), Value::Object(args));
        Ok(Value::Object(out))
    }
}

fn raw_str(raw: &Value, key: &str) -> String {
    raw.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
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
            source_name: raw_str(raw, "source"),
            required: CapabilitySet::new([SQL_POOL]),
            parameters: vec![],
            auth_required: vec![],
            echo_key: "statement",
            echo_value: raw_str(raw, "statement"),
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
            source_name: raw_str(raw, "source"),
            required: CapabilitySet::new([HTTP_CLIENT]),
            parameters: vec![],
            auth_required: vec![],
            echo_key: "url",
            echo_value: raw_str(raw, "url"),
        }))
    }
}

pub fn source_registry() -> SourceRegistry {
    let registry = SourceRegistry::new("source");
    registry.register("stub-sql", Arc::new(StubSqlSourceFactory));
    registry.register("stub-http", Arc::new(StubHttpSourceFactory));
    registry
}

pub fn tool_registry() -> ToolRegistry {
    let registry = ToolRegistry::new("tool");
    registry.register("stub-sql", Arc::new(StubSqlToolFactory));
    registry.register("stub-http", Arc::new(StubHttpToolFactory));
    registry
}
