//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::scenario::ScenarioRunner;

/// Execute the `run` command
pub fn run_scenario(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading scenario");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load scenario from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref name) = args.name {
        info!(name = %name, "Overriding dispatcher name from CLI");
        blueprint.dispatcher.name = name.clone();
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!(
        dispatcher = %blueprint.dispatcher.name,
        stores = blueprint.stores.len(),
        actions = blueprint.actions.len(),
        stop_on_error = args.stop_on_error,
        "Scenario loaded"
    );

    let report = ScenarioRunner::new(blueprint)
        .stop_on_error(args.stop_on_error)
        .run();

    if args.json {
        let json = report.to_json().context("Failed to serialize run report")?;
        println!("{}", json);
    } else {
        report.print_summary();
    }

    info!(
        dispatched = report.actions.len(),
        failures = report.failures(),
        "Scenario finished"
    );

    match report.abort {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
