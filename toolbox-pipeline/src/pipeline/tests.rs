//! Pipeline tests use their own stub `Source`/`Tool` kinds rather than
//! `toolbox-interfaces`'s `test_support` module, which is `pub(crate)` there
//! and so invisible from this crate.

use std::any::Any;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::{json, Value};

use toolbox_auth::AuthManager;
use toolbox_core::{ErrorCategory, Result as ToolboxResult, ToolboxError};
use toolbox_interfaces::{Capability, CapabilitySet, Source};
use toolbox_params::{ParamValues, Parameter, ParamType};
use toolbox_registry::Toolset;

use super::*;

const SQL_POOL: Capability = Capability::new("sql.pool");

#[derive(Debug)]
struct StubSource {
    name: String,
}

#[async_trait]
impl Source for StubSource {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &str {
        "stub"
    }
    fn capabilities(&self) -> &CapabilitySet {
        static CAPS: OnceLock<CapabilitySet> = OnceLock::new();
        CAPS.get_or_init(|| CapabilitySet::new([SQL_POOL]))
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Echoes its resolved parameters and expanded template back as the result,
/// and can be made to sleep past a deadline to exercise §5 timeout handling.
struct EchoTool {
    name: String,
    source_name: String,
    parameters: Vec<Parameter>,
    template_parameters: Vec<Parameter>,
    template_text: Option<String>,
    auth_required: Vec<String>,
    sleep: Option<Duration>,
}

impl EchoTool {
    fn new(name: &str, source_name: &str) -> Self {
        Self {
            name: name.to_string(),
            source_name: source_name.to_string(),
            parameters: Vec::new(),
            template_parameters: Vec::new(),
            template_text: None,
            auth_required: Vec::new(),
            sleep: None,
        }
    }

    fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    fn with_template(mut self, text: &str, params: Vec<Parameter>) -> Self {
        self.template_text = Some(text.to_string());
        self.template_parameters = params;
        self
    }

    fn with_auth_required(mut self, services: Vec<String>) -> Self {
        self.auth_required = services;
        self
    }

    fn with_sleep(mut self, duration: Duration) -> Self {
        self.sleep = Some(duration);
        self
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "test-only echo tool"
    }
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
    fn template_parameters(&self) -> &[Parameter] {
        &self.template_parameters
    }
    fn auth_required(&self) -> &[String] {
        &self.auth_required
    }
    fn source_name(&self) -> &str {
        &self.source_name
    }
    fn template_text(&self) -> Option<&str> {
        self.template_text.as_deref()
    }
    fn required_capabilities(&self) -> &CapabilitySet {
        static CAPS: OnceLock<CapabilitySet> = OnceLock::new();
        CAPS.get_or_init(|| CapabilitySet::new([SQL_POOL]))
    }
    async fn invoke(
        &self,
        _source: &dyn Source,
        params: &ParamValues,
        expanded_template: Option<&str>,
    ) -> ToolboxResult<Value> {
        if let Some(duration) = self.sleep {
            tokio::time::sleep(duration).await;
        }
        let mut out = serde_json::Map::new();
        for entry in params.iter() {
            out.insert(entry.name.clone(), entry.value.to_json());
        }
        if let Some(text) = expanded_template {
            out.insert("__template".to_string(), json!(text));
        }
        Ok(Value::Object(out))
    }
}

fn string_param(name: &str, required: bool) -> Parameter {
    Parameter {
        name: name.to_string(),
        param_type: ParamType::String,
        description: String::new(),
        required: Some(required),
        default: None,
        auth_services: vec![],
        items: None,
        value_type: None,
        allowed_keys: None,
        allow_unsafe_template_value: false,
    }
}

fn pipeline_with(tools: Vec<Arc<dyn Tool>>, auth: AuthManager) -> Pipeline {
    let mut sources: SourceMap = indexmap::IndexMap::new();
    sources.insert("db".to_string(), Arc::new(StubSource { name: "db".to_string() }) as Arc<dyn Source>);

    let mut tool_map: ToolMap = indexmap::IndexMap::new();
    for tool in tools {
        tool_map.insert(tool.name().to_string(), tool);
    }

    let mut toolsets = indexmap::IndexMap::new();
    toolsets.insert("".to_string(), Toolset::implicit_all(&tool_map));

    Pipeline::new(sources, tool_map, toolsets, auth)
}

fn request<'a>(toolset: &'a str, tool: &'a str, body: &'a Value, headers: &'a HeaderMap) -> InvokeRequest<'a> {
    InvokeRequest {
        toolset,
        tool,
        body,
        headers,
        deadline: None,
    }
}

#[tokio::test]
async fn successful_invocation_echoes_parameters_and_records_success() {
    let tool = Arc::new(EchoTool::new("greet", "db").with_parameters(vec![string_param("name", true)]));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({"name": "ada"});
    let headers = HeaderMap::new();
    let result = pipeline.invoke(request("", "greet", &body, &headers)).await.unwrap();

    assert_eq!(result["name"], json!("ada"));
    assert_eq!(pipeline.counters().success_count("greet"), 1);
}

#[tokio::test]
async fn unknown_toolset_is_rejected() {
    let tool = Arc::new(EchoTool::new("greet", "db"));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({});
    let headers = HeaderMap::new();
    let err = pipeline
        .invoke(request("nope", "greet", &body, &headers))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolboxError::UnknownToolset(_)));
}

#[tokio::test]
async fn tool_outside_addressed_toolset_is_unknown_there() {
    let tool = Arc::new(EchoTool::new("greet", "db"));
    let mut pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));
    // Address a toolset that exists but doesn't list this tool.
    pipeline.toolsets.insert("empty".to_string(), Toolset::new("empty", vec![]));

    let body = json!({});
    let headers = HeaderMap::new();
    let err = pipeline
        .invoke(request("empty", "greet", &body, &headers))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolboxError::UnknownTool(_)));
    assert_eq!(pipeline.counters().failure_count("greet", ErrorCategory::UnknownTool), 1);
}

#[tokio::test]
async fn missing_required_auth_service_is_unauthorized() {
    let tool = Arc::new(EchoTool::new("greet", "db").with_auth_required(vec!["google".to_string()]));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({});
    let headers = HeaderMap::new();
    let err = pipeline.invoke(request("", "greet", &body, &headers)).await.unwrap_err();
    assert!(matches!(err, ToolboxError::Unauthorized(_)));
}

#[tokio::test]
async fn extraneous_body_key_is_rejected() {
    let tool = Arc::new(EchoTool::new("greet", "db").with_parameters(vec![string_param("name", true)]));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({"name": "ada", "unexpected": true});
    let headers = HeaderMap::new();
    let err = pipeline.invoke(request("", "greet", &body, &headers)).await.unwrap_err();
    match err {
        ToolboxError::InvalidParameter(msg) => assert!(msg.contains("unexpected")),
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_required_parameter_is_invalid_parameter() {
    let tool = Arc::new(EchoTool::new("greet", "db").with_parameters(vec![string_param("name", true)]));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({});
    let headers = HeaderMap::new();
    let err = pipeline.invoke(request("", "greet", &body, &headers)).await.unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidParameter(_)));
    assert_eq!(
        pipeline.counters().failure_count("greet", ErrorCategory::InvalidParameter),
        1
    );
}

#[tokio::test]
async fn template_expansion_substitutes_whitelisted_literal() {
    let tool = Arc::new(
        EchoTool::new("list_rows", "db")
            .with_template("SELECT * FROM {{.table}}", vec![string_param("table", true)]),
    );
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({"table": "orders_2024"});
    let headers = HeaderMap::new();
    let result = pipeline
        .invoke(request("", "list_rows", &body, &headers))
        .await
        .unwrap();
    assert_eq!(result["__template"], json!("SELECT * FROM orders_2024"));
}

#[tokio::test]
async fn unsafe_template_value_is_rejected() {
    let tool = Arc::new(
        EchoTool::new("list_rows", "db")
            .with_template("SELECT * FROM {{.table}}", vec![string_param("table", true)]),
    );
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({"table": "orders; DROP TABLE users"});
    let headers = HeaderMap::new();
    let err = pipeline
        .invoke(request("", "list_rows", &body, &headers))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidParameter(_)));
}

#[tokio::test]
async fn slow_backend_call_surfaces_as_deadline_exceeded() {
    let tool = Arc::new(EchoTool::new("slow", "db").with_sleep(Duration::from_millis(50)));
    let pipeline = pipeline_with(vec![tool], AuthManager::new(vec![]));

    let body = json!({});
    let headers = HeaderMap::new();
    let mut req = request("", "slow", &body, &headers);
    req.deadline = Some(Duration::from_millis(5));
    let err = pipeline.invoke(req).await.unwrap_err();
    assert!(matches!(
        err,
        ToolboxError::Backend(toolbox_core::BackendError::DeadlineExceeded(_))
    ));
}
