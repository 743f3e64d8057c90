//! Scenario parsing
//!
//! TOML (preferred) and JSON.

use contracts::{ContractError, ScenarioBlueprint};

/// Scenario file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (preferred)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML scenario
pub fn parse_toml(content: &str) -> Result<ScenarioBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON scenario
pub fn parse_json(content: &str) -> Result<ScenarioBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<ScenarioBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[dispatcher]
name = "todo-app"

[[stores]]
name = "todo"

[[stores]]
name = "stats"
wait_for = ["todo"]
handles = ["todo/create"]

[[actions]]
kind = "todo/create"
data = { text = "buy milk" }
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.dispatcher.name, "todo-app");
        assert!(bp.dispatcher.record_metrics);
        assert_eq!(bp.stores.len(), 2);
        assert_eq!(bp.stores[1].wait_for, vec!["todo".to_string()]);
        assert_eq!(bp.actions[0].data["text"], "buy milk");
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "stores": [
                { "name": "todo" },
                { "name": "stats", "wait_for": ["todo"] }
            ],
            "actions": [{ "kind": "todo/create", "data": { "text": "buy milk" } }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().dispatcher.name, "default");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_rejects_unknown_shape() {
        let result = parse_json(r#"{ "stores": [{ "wait_for": ["x"] }] }"#);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("JSON"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
