//! # Flux Dispatch CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Scenario loading and validation
//! - Scenario runs through a dispatcher, with a per-action report

mod cli;
mod commands;
mod error;
mod scenario;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_scenario, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: cli.default_log_level().to_string(),
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Flux dispatch CLI starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_scenario(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
