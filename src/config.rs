use crate::definitions::SchemaVersion;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Construction parameters of an editor instance.
///
/// ```json
/// {
///   "server_url": "https://example.org/api",
///   "token": "secret",
///   "definitions": { "kind": "operator_list", "schema_version": "v1" },
///   "loader": { "timeout_secs": 10 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(alias = "serverUrl")]
    pub server_url: String,
    pub token: String,
    #[serde(default)]
    pub definitions: DefinitionsVariant,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl EditorConfig {
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
            definitions: DefinitionsVariant::default(),
            loader: LoaderConfig::default(),
        }
    }

    pub fn with_definitions(mut self, definitions: DefinitionsVariant) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }
}

/// Which definitions representation this deployment synchronizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionsVariant {
    /// A `{"definitions": {...}}` catalog, published as `schema`.
    #[default]
    Catalog,
    /// A list of workflow operators, published as `definitions`.
    OperatorList {
        #[serde(default)]
        schema_version: SchemaVersion,
    },
}

impl DefinitionsVariant {
    /// Name of the synchronized field holding the definitions.
    pub fn wire_field(self) -> &'static str {
        match self {
            Self::Catalog => "schema",
            Self::OperatorList { .. } => "definitions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("workflow-editor/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = EditorConfig::from_json_str(r#"{"serverUrl": "http://x", "token": "t"}"#)
            .expect("config should parse");
        assert_eq!(config.server_url, "http://x");
        assert_eq!(config.definitions, DefinitionsVariant::Catalog);
        assert_eq!(config.loader.timeout_secs, 30);
        assert!(config.loader.user_agent.starts_with("workflow-editor/"));
    }

    #[test]
    fn operator_list_variant() {
        let config = EditorConfig::from_json_str(
            r#"{"server_url": "http://x", "token": "t",
                "definitions": {"kind": "operator_list", "schema_version": "v1"}}"#,
        )
        .expect("config should parse");
        assert_eq!(
            config.definitions,
            DefinitionsVariant::OperatorList {
                schema_version: SchemaVersion::V1
            }
        );
        assert_eq!(config.definitions.wire_field(), "definitions");
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = EditorConfig::from_json_str(r#"{"server_url": "http://x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::JsonParseError(_)));
    }
}
