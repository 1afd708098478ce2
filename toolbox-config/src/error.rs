//! Config-load error taxonomy (§4.2, §7: "any structural error, reference error, or
//! collision is fatal — the server refuses to start").

use thiserror::Error;
use toolbox_core::ToolboxError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable(s) not set and no default supplied: {names:?}")]
    MissingEnvVar { names: Vec<String> },

    #[error("top-level key '{key}' is not one of sources/authServices/tools/toolsets")]
    UnknownTopLevelKey { key: String },

    #[error("'{section}' must be a YAML mapping of name -> entry")]
    NotAMapping { section: String },

    #[error("{section} entry '{name}' is missing required field '{field}'")]
    MissingField {
        section: String,
        name: String,
        field: String,
    },

    #[error("{section} entry '{name}' has unknown kind '{kind}'")]
    UnknownKind {
        section: String,
        name: String,
        kind: String,
    },

    #[error("tool '{tool}' references unknown source '{source}'")]
    UnknownSource { tool: String, source: String },

    #[error("tool '{tool}' declares authRequired service '{service}' which is not a declared auth service")]
    UnknownAuthService { tool: String, service: String },

    #[error(
        "parameter '{parameter}' of tool '{tool}' is bound to auth service '{service}' which is not declared"
    )]
    ParameterUnknownAuthService {
        tool: String,
        parameter: String,
        service: String,
    },

    #[error("tool '{tool}' declares the same name '{name}' as both a standard and a template parameter")]
    ParameterNamespaceCollision { tool: String, name: String },

    #[error("toolset '{name}' references unknown tool '{tool}'")]
    UnknownToolInToolset { name: String, tool: String },

    #[error("toolset name \"\" is reserved for the implicit all-tools toolset")]
    ReservedToolsetName,

    #[error("toolset '{name}' lists tool '{tool}' more than once")]
    DuplicateToolInToolset { name: String, tool: String },

    #[error("unknown prebuilt config '{name}'")]
    UnknownPrebuilt { name: String },

    #[error(transparent)]
    Toolbox(#[from] ToolboxError),
}

impl From<ConfigError> for ToolboxError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Toolbox(inner) => inner,
            other => ToolboxError::Config(other.to_string()),
        }
    }
}
