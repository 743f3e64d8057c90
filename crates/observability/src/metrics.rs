//! Dispatcher metrics
//!
//! `record_*` functions feed the global `metrics` recorder; the aggregator keeps
//! an in-memory view for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::DispatchError;
use metrics::{counter, gauge, histogram};

/// Record a finished dispatch cycle
///
/// `outcome` is `"ok"` or `"error"`.
pub fn record_dispatch_cycle(dispatcher: &str, outcome: &str, callbacks: u64, duration_ms: f64) {
    counter!(
        "flux_dispatch_cycles_total",
        "dispatcher" => dispatcher.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "flux_dispatch_cycle_duration_ms",
        "dispatcher" => dispatcher.to_string()
    )
    .record(duration_ms);

    histogram!(
        "flux_dispatch_callbacks_per_cycle",
        "dispatcher" => dispatcher.to_string()
    )
    .record(callbacks as f64);
}

/// Record a callback invocation
///
/// `deferred` marks invocations pulled forward by `wait_for`.
pub fn record_callback_invoked(dispatcher: &str, deferred: bool) {
    let via = if deferred { "wait_for" } else { "dispatch" };
    counter!(
        "flux_dispatch_callbacks_invoked_total",
        "dispatcher" => dispatcher.to_string(),
        "via" => via.to_string()
    )
    .increment(1);
}

/// Record a dispatcher error by its stable code
pub fn record_dispatch_error(dispatcher: &str, error: &DispatchError) {
    counter!(
        "flux_dispatch_errors_total",
        "dispatcher" => dispatcher.to_string(),
        "code" => error.code().to_string()
    )
    .increment(1);
}

/// Record the number of registered callbacks
pub fn record_registry_size(dispatcher: &str, size: usize) {
    gauge!(
        "flux_dispatch_registered_callbacks",
        "dispatcher" => dispatcher.to_string()
    )
    .set(size as f64);
}

/// In-memory aggregation of dispatch cycles
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Cycles that ran to completion
    pub completed_cycles: u64,

    /// Cycles aborted by an error
    pub failed_cycles: u64,

    /// Callbacks invoked per completed cycle
    pub callback_stats: RunningStats,

    /// Total invocations pulled forward by `wait_for`
    pub total_deferred: u64,

    /// Cycle duration (ms), all cycles
    pub duration_stats: RunningStats,

    /// Failures by error code
    pub error_counts: BTreeMap<String, u64>,
}

impl DispatchStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account a completed cycle
    pub fn record_success(&mut self, callbacks: u64, deferred: u64, duration_ms: f64) {
        self.completed_cycles += 1;
        self.total_deferred += deferred;
        self.callback_stats.push(callbacks as f64);
        self.duration_stats.push(duration_ms);
    }

    /// Account a failed cycle
    pub fn record_failure(&mut self, error: &DispatchError, duration_ms: f64) {
        self.failed_cycles += 1;
        self.duration_stats.push(duration_ms);
        *self.error_counts.entry(error.code().to_string()).or_insert(0) += 1;
    }

    pub fn total_cycles(&self) -> u64 {
        self.completed_cycles + self.failed_cycles
    }

    /// Summarize
    pub fn summary(&self) -> DispatchSummary {
        let total = self.total_cycles();
        DispatchSummary {
            total_cycles: total,
            completed_cycles: self.completed_cycles,
            failed_cycles: self.failed_cycles,
            failure_rate: if total > 0 {
                self.failed_cycles as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            total_deferred: self.total_deferred,
            callbacks_per_cycle: StatsSummary::from(&self.callback_stats),
            duration_ms: StatsSummary::from(&self.duration_stats),
            error_counts: self.error_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_cycles: u64,
    pub completed_cycles: u64,
    pub failed_cycles: u64,
    pub failure_rate: f64,
    pub total_deferred: u64,
    pub callbacks_per_cycle: StatsSummary,
    pub duration_ms: StatsSummary,
    pub error_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total cycles: {}", self.total_cycles)?;
        writeln!(
            f,
            "Failed cycles: {} ({:.2}%)",
            self.failed_cycles, self.failure_rate
        )?;
        writeln!(f, "Deferred invocations: {}", self.total_deferred)?;
        writeln!(f, "Callbacks per cycle: {}", self.callbacks_per_cycle)?;
        writeln!(f, "Cycle duration (ms): {}", self.duration_ms)?;

        if !self.error_counts.is_empty() {
            writeln!(f, "Errors:")?;
            for (code, count) in &self.error_counts {
                writeln!(f, "  {}: {}", code, count)?;
            }
        }

        Ok(())
    }
}

/// Min/max/mean/std summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
