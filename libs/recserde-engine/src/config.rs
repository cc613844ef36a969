use serde::Deserialize;

use crate::error::EngineError;

/// Root configuration, parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Serde instance definitions.
    #[serde(default)]
    pub serdes: Vec<SerdeConfig>,
}

/// One named serde instance.
///
/// ```toml
/// [[serdes]]
/// name = "cards-in"
/// plugin = "card-bridge"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerdeConfig {
    /// Name the engine refers to this instance by.
    pub name: String,
    /// Catalog name of the plugin.
    pub plugin: String,
    /// Plugin settings. Current plugins accept none, so a non-empty table
    /// fails at bootstrap.
    #[serde(default)]
    pub config: Option<toml::Value>,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serde_list() {
        let config = EngineConfig::parse(
            r#"
            [[serdes]]
            name = "cards-in"
            plugin = "card-bridge"

            [[serdes]]
            name = "cards-out"
            plugin = "card-object"
            config = { level = 3 }
            "#,
        )
        .unwrap();

        assert_eq!(config.serdes.len(), 2);
        assert_eq!(config.serdes[0].plugin, "card-bridge");
        assert!(config.serdes[0].config.is_none());
        let settings = config.serdes[1].config.as_ref().and_then(|v| v.get("level"));
        assert_eq!(settings.and_then(toml::Value::as_integer), Some(3));
    }

    #[test]
    fn empty_config_has_no_serdes() {
        assert!(EngineConfig::parse("").unwrap().serdes.is_empty());
    }

    #[test]
    fn rejects_missing_plugin() {
        let err = EngineConfig::parse("[[serdes]]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = EngineConfig::parse("api_port = 1\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn missing_file() {
        let err = EngineConfig::load("/nonexistent/recserde.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/recserde.toml"));
    }
}
