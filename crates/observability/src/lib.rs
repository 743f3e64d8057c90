//! # Observability
//!
//! Tracing initialization and dispatcher metrics.
//!
//! ## Features
//!
//! - Tracing setup (JSON / Pretty / Compact), honoring `RUST_LOG`
//! - Optional Prometheus exporter
//! - `record_*` helpers and an in-memory `DispatchStatsAggregator`
//!
//! ## Example
//!
//! ```ignore
//! use observability::{ObservabilityConfig, LogFormat};
//!
//! observability::init_with_config(ObservabilityConfig {
//!     log_format: LogFormat::Pretty,
//!     ..Default::default()
//! })?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_callback_invoked, record_dispatch_cycle, record_dispatch_error, record_registry_size,
    DispatchStatsAggregator, DispatchSummary, RunningStats, StatsSummary,
};

/// Initialize with defaults (JSON logs, no exporter)
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Observability settings
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Level used when `RUST_LOG` is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON
    #[default]
    Json,
    /// Human readable
    Pretty,
    /// Single line
    Compact,
}

/// Initialize with custom settings
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// Install only the Prometheus exporter
///
/// For hosts that set up tracing themselves.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.default_log_level, "info");
    }
}
