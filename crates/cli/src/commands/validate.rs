//! `validate` command implementation.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use contracts::ScenarioBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    dispatcher: String,
    store_count: usize,
    dependency_count: usize,
    action_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating scenario");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Scenario validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    dispatcher: blueprint.dispatcher.name.clone(),
                    store_count: blueprint.stores.len(),
                    dependency_count: blueprint.stores.iter().map(|s| s.wait_for.len()).sum(),
                    action_count: blueprint.actions.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal issues
///
/// A dependency cycle is only a warning: the dispatcher reports it as a
/// `CircularDependency` error at run time, for the actions that reach it.
fn collect_warnings(blueprint: &ScenarioBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.stores.is_empty() {
        warnings.push("No stores configured - every dispatch is a no-op".to_string());
    }
    if blueprint.actions.is_empty() {
        warnings.push("No actions configured - nothing will be dispatched".to_string());
    }

    if let Some(cycle) = config_loader::find_dependency_cycle(blueprint) {
        warnings.push(format!(
            "Dependency cycle: {} - dispatches reaching it will fail",
            cycle.join(" -> ")
        ));
    }

    let kinds: BTreeSet<&str> = blueprint.actions.iter().map(|a| a.kind.as_str()).collect();
    for store in &blueprint.stores {
        if !kinds.is_empty() && !kinds.iter().any(|kind| store.handles_kind(kind)) {
            warnings.push(format!(
                "Store '{}' handles none of the scenario's action kinds",
                store.name
            ));
        }
        for kind in &store.fail_on {
            if !store.handles_kind(kind) {
                warnings.push(format!(
                    "Store '{}' fails on '{}' but does not handle it",
                    store.name, kind
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Scenario is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Dispatcher: {}", summary.dispatcher);
            println!("  Stores: {}", summary.store_count);
            println!("  Dependencies: {}", summary.dependency_count);
            println!("  Actions: {}", summary.action_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Scenario is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Action, StoreConfig};

    fn blueprint(stores: Vec<StoreConfig>, kinds: &[&str]) -> ScenarioBlueprint {
        ScenarioBlueprint {
            version: Default::default(),
            dispatcher: Default::default(),
            stores,
            actions: kinds.iter().map(|k| Action::new(*k)).collect(),
        }
    }

    #[test]
    fn test_empty_scenario_warnings() {
        let warnings = collect_warnings(&blueprint(Vec::new(), &[]));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_cycle_warning() {
        let mut a = StoreConfig::new("a");
        a.wait_for = vec!["b".into()];
        let mut b = StoreConfig::new("b");
        b.wait_for = vec!["a".into()];

        let warnings = collect_warnings(&blueprint(vec![a, b], &["x"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Dependency cycle: "));
    }

    #[test]
    fn test_unreachable_store_warnings() {
        let mut todo = StoreConfig::new("todo");
        todo.handles = vec!["todo/create".into()];
        todo.fail_on = vec!["todo/delete".into()];

        let warnings = collect_warnings(&blueprint(vec![todo], &["user/login"]));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("handles none"));
        assert!(warnings[1].contains("does not handle"));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "does-not-exist.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
