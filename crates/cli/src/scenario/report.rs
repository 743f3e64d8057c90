//! Run report and statistics.

use dispatcher::MetricsSnapshot;
use observability::DispatchStatsAggregator;
use serde::Serialize;

use crate::error::CliError;

/// Outcome of dispatching one action
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    /// Position in the scenario action list
    pub index: usize,

    /// Action kind
    pub kind: String,

    /// Stores in the order they finished handling the action
    pub handled_by: Vec<String>,

    /// Error code, if the dispatch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,

    /// Error message, if the dispatch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a scenario run
#[derive(Debug)]
pub struct RunReport {
    /// Dispatcher name
    pub dispatcher: String,

    /// Number of registered stores
    pub store_count: usize,

    /// Per-action outcomes, in dispatch order
    pub actions: Vec<ActionReport>,

    /// Aggregated cycle statistics
    pub stats: DispatchStatsAggregator,

    /// Dispatcher counters at the end of the run
    pub metrics: MetricsSnapshot,

    /// Set when the run stopped at a failing dispatch
    pub abort: Option<CliError>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    dispatcher: &'a str,
    store_count: usize,
    aborted: bool,
    actions: &'a [ActionReport],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    total_cycles: u64,
    completed_cycles: u64,
    failed_cycles: u64,
    callbacks_invoked: u64,
    deferred_invocations: u64,
    rejected_calls: u64,
}

impl RunReport {
    /// Number of failed dispatches
    pub fn failures(&self) -> usize {
        self.actions.iter().filter(|a| !a.succeeded()).count()
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let summary = self.stats.summary();
        let report = JsonReport {
            dispatcher: &self.dispatcher,
            store_count: self.store_count,
            aborted: self.abort.is_some(),
            actions: &self.actions,
            summary: JsonSummary {
                total_cycles: summary.total_cycles,
                completed_cycles: summary.completed_cycles,
                failed_cycles: summary.failed_cycles,
                callbacks_invoked: self.metrics.callbacks_invoked,
                deferred_invocations: self.metrics.deferred_invocations,
                rejected_calls: self.metrics.rejected_calls,
            },
        };
        serde_json::to_string_pretty(&report)
    }

    /// Print the per-action trace and a statistics summary
    pub fn print_summary(&self) {
        println!(
            "\nDispatcher '{}' ({} stores)\n",
            self.dispatcher, self.store_count
        );

        for action in &self.actions {
            let order = if action.handled_by.is_empty() {
                "(no store handled it)".to_string()
            } else {
                action.handled_by.join(" -> ")
            };
            match &action.error {
                None => println!("  ✓ #{} {}: {}", action.index, action.kind, order),
                Some(error) => {
                    println!("  ✗ #{} {}: {}", action.index, action.kind, order);
                    println!("      └─ {}", error);
                }
            }
        }

        let summary = self.stats.summary();
        println!("\nStatistics");
        println!("   ├─ Cycles: {}", summary.total_cycles);
        println!(
            "   ├─ Failed: {} ({:.2}%)",
            summary.failed_cycles, summary.failure_rate
        );
        println!("   ├─ Callbacks invoked: {}", self.metrics.callbacks_invoked);
        println!(
            "   ├─ Pulled forward by wait_for: {}",
            self.metrics.deferred_invocations
        );
        println!("   ├─ Callbacks per cycle: {}", summary.callbacks_per_cycle);
        println!("   └─ Cycle duration (ms): {}", summary.duration_ms);

        if !summary.error_counts.is_empty() {
            println!("\nErrors");
            for (code, count) in &summary.error_counts {
                println!("   ├─ {}: {}", code, count);
            }
        }

        if self.abort.is_some() {
            println!("\nRun stopped at the first failing dispatch.");
        }

        println!();
    }
}
