//! The config loader (§4.2): env substitution, kind-registry decoding, and
//! cross-reference validation, producing a [`LoadedConfig`] or a fatal error.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde_json::Value;

use toolbox_auth::{AuthManager, AuthServiceVerifier};
use toolbox_core::ToolboxError;
use toolbox_interfaces::Tool;
use toolbox_registry::{
    build_manifests, check_capability_match, AuthServiceRegistry, SourceMap, SourceRegistry,
    ToolMap, ToolRegistry, Toolset, ToolsetManifests,
};

use crate::document::LoadedConfig;
use crate::env_subst;
use crate::error::ConfigError;

const TOP_LEVEL_KEYS: &[&str] = &["sources", "authServices", "tools", "toolsets"];

/// Loads a tools-file YAML document into a fully wired, cross-validated
/// [`LoadedConfig`], against the three process-wide kind registries (§4.1).
///
/// The loader never opens connections itself beyond what each `SourceFactory`
/// and `AuthServiceVerifier` does during decoding (§4.2: "the loader does not
/// open connections; it only produces configs" applies to the *shape*, but
/// JWKS fetch and source connection are part of decoding a kind-specific entry
/// into its live handle, exactly as §4.4/§4.2 describe).
pub struct ConfigLoader {
    sources: Arc<SourceRegistry>,
    tools: Arc<ToolRegistry>,
    auth_services: Arc<AuthServiceRegistry>,
}

impl ConfigLoader {
    pub fn new(
        sources: Arc<SourceRegistry>,
        tools: Arc<ToolRegistry>,
        auth_services: Arc<AuthServiceRegistry>,
    ) -> Self {
        Self {
            sources,
            tools,
            auth_services,
        }
    }

    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        self.load_str(&raw).await
    }

    pub async fn load_str(&self, raw_yaml: &str) -> Result<LoadedConfig, ConfigError> {
        let substituted = env_subst::substitute(raw_yaml)?;
        self.load_substituted(&substituted).await
    }

    async fn load_substituted(&self, yaml: &str) -> Result<LoadedConfig, ConfigError> {
        let document: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(yaml)?;

        for key in document.keys() {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::UnknownTopLevelKey { key: key.clone() });
            }
        }

        let sources = self.load_sources(document.get("sources"))?;
        let auth = self.load_auth_services(document.get("authServices")).await?;
        let tools = self.load_tools(document.get("tools"), &sources, &auth)?;
        let (toolsets, manifests) = self.load_toolsets(document.get("toolsets"), &tools)?;

        Ok(LoadedConfig {
            sources,
            tools,
            toolsets,
            manifests,
            auth,
        })
    }

    fn load_sources(
        &self,
        raw: Option<&serde_yaml::Value>,
    ) -> Result<SourceMap, ConfigError> {
        let mut sources = SourceMap::new();
        let Some(raw) = raw else { return Ok(sources) };
        for (name, entry) in as_mapping("sources", raw)? {
            let json = to_json(entry)?;
            let kind = require_kind("sources", &name, &json)?;
            let factory = self.sources.get(&kind).ok_or_else(|| ConfigError::UnknownKind {
                section: "sources".to_string(),
                name: name.clone(),
                kind: kind.clone(),
            })?;
            let source = factory.build(&name, &json).map_err(ConfigError::Toolbox)?;
            sources.insert(name, source);
        }
        Ok(sources)
    }

    async fn load_auth_services(
        &self,
        raw: Option<&serde_yaml::Value>,
    ) -> Result<AuthManager, ConfigError> {
        let mut verifiers = Vec::new();
        let Some(raw) = raw else { return Ok(AuthManager::new(verifiers)) };
        for (name, entry) in as_mapping("authServices", raw)? {
            let json = to_json(entry)?;
            let kind = require_kind("authServices", &name, &json)?;
            let factory = self.auth_services.get(&kind).ok_or_else(|| ConfigError::UnknownKind {
                section: "authServices".to_string(),
                name: name.clone(),
                kind: kind.clone(),
            })?;
            let config = factory.build(&name, &json).map_err(ConfigError::Toolbox)?;
            let verifier = AuthServiceVerifier::new(config)
                .await
                .map_err(ToolboxError::from)?;
            verifiers.push(verifier);
        }
        Ok(AuthManager::new(verifiers))
    }

    fn load_tools(
        &self,
        raw: Option<&serde_yaml::Value>,
        sources: &SourceMap,
        auth: &AuthManager,
    ) -> Result<ToolMap, ConfigError> {
        let mut tools = ToolMap::new();
        let Some(raw) = raw else { return Ok(tools) };
        for (name, entry) in as_mapping("tools", raw)? {
            let json = to_json(entry)?;
            let kind = require_kind("tools", &name, &json)?;
            let factory = self.tools.get(&kind).ok_or_else(|| ConfigError::UnknownKind {
                section: "tools".to_string(),
                name: name.clone(),
                kind: kind.clone(),
            })?;

            let source_name = json
                .get("source")
                .and_then(Value::as_str)
                .ok_or_else(|| ConfigError::MissingField {
                    section: "tools".to_string(),
                    name: name.clone(),
                    field: "source".to_string(),
                })?
                .to_string();
            let source = sources.get(&source_name).ok_or_else(|| ConfigError::UnknownSource {
                tool: name.clone(),
                source: source_name.clone(),
            })?;

            let tool = factory
                .build(&name, &json, source.clone())
                .map_err(ConfigError::Toolbox)?;

            check_capability_match(tool.as_ref(), source.as_ref()).map_err(ConfigError::Toolbox)?;
            validate_tool_auth_references(&tool, auth)?;
            validate_parameter_namespaces(&tool)?;

            tools.insert(name, tool);
        }
        Ok(tools)
    }

    fn load_toolsets(
        &self,
        raw: Option<&serde_yaml::Value>,
        tools: &ToolMap,
    ) -> Result<(IndexMap<String, Toolset>, IndexMap<String, ToolsetManifests>), ConfigError> {
        let mut toolsets = IndexMap::new();

        if let Some(raw) = raw {
            for (name, entry) in as_mapping("toolsets", raw)? {
                if name.is_empty() {
                    return Err(ConfigError::ReservedToolsetName);
                }
                let tool_names: Vec<String> = serde_yaml::from_value(entry.clone())?;
                let mut seen = HashSet::new();
                for tool_name in &tool_names {
                    if !tools.contains_key(tool_name) {
                        return Err(ConfigError::UnknownToolInToolset {
                            name: name.clone(),
                            tool: tool_name.clone(),
                        });
                    }
                    if !seen.insert(tool_name.clone()) {
                        return Err(ConfigError::DuplicateToolInToolset {
                            name: name.clone(),
                            tool: tool_name.clone(),
                        });
                    }
                }
                let key = name.clone();
                toolsets.insert(key, Toolset::new(name, tool_names));
            }
        }

        toolsets.insert("".to_string(), Toolset::implicit_all(tools));

        let mut manifests = IndexMap::new();
        for (name, toolset) in &toolsets {
            manifests.insert(name.clone(), build_manifests(toolset, tools));
        }

        Ok((toolsets, manifests))
    }
}

fn as_mapping<'a>(
    section: &str,
    raw: &'a serde_yaml::Value,
) -> Result<Vec<(String, &'a serde_yaml::Value)>, ConfigError> {
    let mapping = raw.as_mapping().ok_or_else(|| ConfigError::NotAMapping {
        section: section.to_string(),
    })?;
    mapping
        .iter()
        .map(|(k, v)| {
            k.as_str()
                .map(|k| (k.to_string(), v))
                .ok_or_else(|| ConfigError::NotAMapping {
                    section: section.to_string(),
                })
        })
        .collect()
}

fn to_json(value: &serde_yaml::Value) -> Result<Value, ConfigError> {
    serde_json::to_value(value)
        .map_err(|e| ConfigError::Yaml(serde_yaml::Error::custom(e.to_string())))
}

fn require_kind(section: &str, name: &str, json: &Value) -> Result<String, ConfigError> {
    json.get("kind")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingField {
            section: section.to_string(),
            name: name.to_string(),
            field: "kind".to_string(),
        })
}

fn validate_tool_auth_references(tool: &Arc<dyn Tool>, auth: &AuthManager) -> Result<(), ConfigError> {
    for service in tool.auth_required() {
        if !auth.contains(service) {
            return Err(ConfigError::UnknownAuthService {
                tool: tool.name().to_string(),
                service: service.clone(),
            });
        }
    }
    for param in tool.parameters().iter().chain(tool.template_parameters()) {
        for binding in &param.auth_services {
            if !auth.contains(&binding.name) {
                return Err(ConfigError::ParameterUnknownAuthService {
                    tool: tool.name().to_string(),
                    parameter: param.name.clone(),
                    service: binding.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_parameter_namespaces(tool: &Arc<dyn Tool>) -> Result<(), ConfigError> {
    let standard: HashSet<&str> = tool.parameters().iter().map(|p| p.name.as_str()).collect();
    for template_param in tool.template_parameters() {
        if standard.contains(template_param.name.as_str()) {
            return Err(ConfigError::ParameterNamespaceCollision {
                tool: tool.name().to_string(),
                name: template_param.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use toolbox_core::Result as ToolboxResult;
    use toolbox_interfaces::{Capability, CapabilitySet, Source};
    use toolbox_params::{ParamValues, Parameter};
    use toolbox_registry::{check_capability_match, SourceFactory, ToolFactory};

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
            "stub-sql"
        }
        fn capabilities(&self) -> &CapabilitySet {
            static CAPS: std::sync::OnceLock<CapabilitySet> = std::sync::OnceLock::new();
            CAPS.get_or_init(|| CapabilitySet::new([SQL_POOL]))
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct StubSourceFactory;
    impl SourceFactory for StubSourceFactory {
        fn kind(&self) -> &'static str {
            "stub-sql"
        }
        fn build(&self, name: &str, _raw: &Value) -> ToolboxResult<Arc<dyn Source>> {
            Ok(Arc::new(StubSource { name: name.to_string() }))
        }
    }

    struct StubTool {
        name: String,
        source_name: String,
        parameters: Vec<Parameter>,
    }

    #[async_trait]
    impl Tool for StubTool {
        fn name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn parameters(&self) -> &[Parameter] {
            &self.parameters
        }
        fn template_parameters(&self) -> &[Parameter] {
            &[]
        }
        fn auth_required(&self) -> &[String] {
            &[]
        }
        fn source_name(&self) -> &str {
            &self.source_name
        }
        fn required_capabilities(&self) -> &CapabilitySet {
            static CAPS: std::sync::OnceLock<CapabilitySet> = std::sync::OnceLock::new();
            CAPS.get_or_init(|| CapabilitySet::new([SQL_POOL]))
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

    struct StubToolFactory;
    impl ToolFactory for StubToolFactory {
        fn kind(&self) -> &'static str {
            "stub-sql"
        }
        fn build(&self, name: &str, raw: &Value, _source: Arc<dyn Source>) -> ToolboxResult<Arc<dyn Tool>> {
            let source_name = raw["source"].as_str().unwrap().to_string();
            Ok(Arc::new(StubTool {
                name: name.to_string(),
                source_name,
                parameters: vec![],
            }))
        }
    }

    fn loader() -> ConfigLoader {
        let sources: Arc<SourceRegistry> = Arc::new(SourceRegistry::new("source"));
        sources.register("stub-sql", Arc::new(StubSourceFactory));
        let tools: Arc<ToolRegistry> = Arc::new(ToolRegistry::new("tool"));
        tools.register("stub-sql", Arc::new(StubToolFactory));
        let auth = Arc::new(toolbox_registry::default_auth_service_registry());
        ConfigLoader::new(sources, tools, auth)
    }

    #[tokio::test]
    async fn loads_sources_tools_and_implicit_toolset() {
        let yaml = r#"
sources:
  db:
    kind: stub-sql
tools:
  find_user:
    kind: stub-sql
    source: db
    description: find a user by id
"#;
        let loaded = loader().load_str(yaml).await.unwrap();
        assert!(loaded.sources.contains_key("db"));
        assert!(loaded.tools.contains_key("find_user"));
        assert_eq!(
            loaded.toolset_tool_names("").unwrap(),
            &["find_user".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_top_level_key_is_rejected() {
        let yaml = "bogus: {}";
        let err = loader().load_str(yaml).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTopLevelKey { .. }));
    }

    #[tokio::test]
    async fn tool_referencing_unknown_source_fails() {
        let yaml = r#"
tools:
  find_user:
    kind: stub-sql
    source: missing
"#;
        let err = loader().load_str(yaml).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSource { .. }));
    }

    #[tokio::test]
    async fn toolset_referencing_unknown_tool_fails() {
        let yaml = r#"
sources:
  db:
    kind: stub-sql
tools:
  find_user:
    kind: stub-sql
    source: db
toolsets:
  reporting: [missing_tool]
"#;
        let err = loader().load_str(yaml).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnknownToolInToolset { .. }));
    }

    #[tokio::test]
    async fn reserved_empty_toolset_name_is_rejected() {
        let yaml = r#"
toolsets:
  "": []
"#;
        let err = loader().load_str(yaml).await.unwrap_err();
        assert!(matches!(err, ConfigError::ReservedToolsetName));
    }

    #[derive(Debug)]
    struct NoCapsSource;

    #[async_trait]
    impl Source for NoCapsSource {
        fn name(&self) -> &str {
            "db"
        }
        fn kind(&self) -> &str {
            "stub-sql"
        }
        fn capabilities(&self) -> &CapabilitySet {
            static CAPS: std::sync::OnceLock<CapabilitySet> = std::sync::OnceLock::new();
            CAPS.get_or_init(CapabilitySet::default)
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn capability_mismatch_reports_config_error_naming_the_tool() {
        let tool = StubTool {
            name: "find_user".to_string(),
            source_name: "db".to_string(),
            parameters: vec![],
        };
        let err = check_capability_match(&tool, &NoCapsSource).unwrap_err();
        assert!(err.to_string().contains("find_user"));
    }

    #[test]
    fn entry_without_kind_is_a_missing_field_error() {
        let json = json!({"source": "db"});
        let err = require_kind("tools", "find_user", &json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }
}
