//! Scenario execution.

mod report;
mod runner;
mod store;

pub use runner::ScenarioRunner;
