//! # Config Loader
//!
//! Scenario loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON scenario files
//! - Validate stores, dependencies and actions
//! - Produce a `ScenarioBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("scenario.toml")).unwrap();
//! println!("Stores: {}", blueprint.stores.len());
//! ```

mod parser;
mod validator;

pub use contracts::ScenarioBlueprint;
pub use parser::ConfigFormat;
pub use validator::find_dependency_cycle;

use contracts::ContractError;
use std::path::Path;

/// Scenario loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a scenario from a file path
    ///
    /// The format follows the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ScenarioBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a scenario from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ScenarioBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize to a TOML string
    pub fn to_toml(blueprint: &ScenarioBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize to a JSON string
    pub fn to_json(blueprint: &ScenarioBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TODO_TOML: &str = r#"
[dispatcher]
name = "todo-app"
record_metrics = false

[[stores]]
name = "todo"
handles = ["todo/create", "todo/clear"]

[[stores]]
name = "stats"
wait_for = ["todo"]

[[actions]]
kind = "todo/create"
data = { text = "buy milk" }

[[actions]]
kind = "todo/clear"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(TODO_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.dispatcher.name, "todo-app");
        assert!(!bp.dispatcher.record_metrics);
        assert_eq!(bp.actions.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(TODO_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.stores, bp2.stores);
        assert_eq!(bp.actions, bp2.actions);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(TODO_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.dispatcher, bp2.dispatcher);
        assert_eq!(bp.actions, bp2.actions);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[stores]]
name = "stats"
wait_for = ["missing"]
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.unwrap_err().to_string().contains("unknown store"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TODO_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.stores.len(), 2);
    }

    #[test]
    fn test_load_from_path_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_sample_scenario_loads() {
        let content = include_str!("../../../scenarios/todo.toml");
        let bp = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.stores.len(), 3);
        assert_eq!(bp.store("view").unwrap().wait_for, vec!["count", "todo"]);
        assert!(find_dependency_cycle(&bp).is_none());
    }
}
