//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flux Dispatch - run dispatcher scenarios from configuration
#[derive(Parser, Debug)]
#[command(
    name = "flux-dispatch",
    author,
    version,
    about = "Run store/action scenarios through the flux dispatcher",
    long_about = "Loads a scenario (stores with wait_for dependencies plus a list of actions),\n\
                  registers one callback per store and dispatches every action, reporting\n\
                  the order in which stores handled each one."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FLUX_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FLUX_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level used when `RUST_LOG` is unset
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch every action of a scenario
    Run(RunArgs),

    /// Validate a scenario file without running it
    Validate(ValidateArgs),

    /// Display scenario information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to scenario file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "scenario.toml",
        env = "FLUX_DISPATCH_SCENARIO"
    )]
    pub config: PathBuf,

    /// Override the dispatcher name from the scenario
    #[arg(long)]
    pub name: Option<String>,

    /// Stop at the first failing dispatch and exit with an error
    #[arg(long)]
    pub stop_on_error: bool,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FLUX_DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to scenario file to validate
    #[arg(short, long, default_value = "scenario.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to scenario file
    #[arg(short, long, default_value = "scenario.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the action list
    #[arg(long)]
    pub actions: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
