//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ScenarioBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Scenario info for JSON output
#[derive(Serialize)]
struct ScenarioInfo {
    version: String,
    dispatcher: DispatcherInfo,
    stores: Vec<StoreInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<ActionInfo>,
}

#[derive(Serialize)]
struct DispatcherInfo {
    name: String,
    record_metrics: bool,
}

#[derive(Serialize)]
struct StoreInfo {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    wait_for: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    handles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fail_on: Vec<String>,
}

#[derive(Serialize)]
struct ActionInfo {
    index: usize,
    kind: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    data: serde_json::Value,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading scenario info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load scenario from {}", args.config.display()))?;

    if args.json {
        let info = build_scenario_info(&blueprint, args.actions);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize scenario info")?;
        println!("{}", json);
    } else {
        print_scenario_info(&blueprint, args.actions);
    }

    Ok(())
}

fn build_scenario_info(blueprint: &ScenarioBlueprint, with_actions: bool) -> ScenarioInfo {
    let stores = blueprint
        .stores
        .iter()
        .map(|s| StoreInfo {
            name: s.name.clone(),
            wait_for: s.wait_for.clone(),
            handles: s.handles.clone(),
            fail_on: s.fail_on.clone(),
        })
        .collect();

    let actions = if with_actions {
        blueprint
            .actions
            .iter()
            .enumerate()
            .map(|(index, a)| ActionInfo {
                index,
                kind: a.kind.clone(),
                data: a.data.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ScenarioInfo {
        version: format!("{:?}", blueprint.version),
        dispatcher: DispatcherInfo {
            name: blueprint.dispatcher.name.clone(),
            record_metrics: blueprint.dispatcher.record_metrics,
        },
        stores,
        actions,
    }
}

fn print_scenario_info(blueprint: &ScenarioBlueprint, with_actions: bool) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Flux Dispatch Scenario                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Dispatcher");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.dispatcher.name);
    println!("   └─ Metrics: {}", blueprint.dispatcher.record_metrics);

    println!("\n🗄  Stores ({}, registration order)", blueprint.stores.len());
    for (i, store) in blueprint.stores.iter().enumerate() {
        let is_last = i == blueprint.stores.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {}", prefix, store.name);
        if !store.wait_for.is_empty() {
            println!("   {}  ├─ waits for: {}", child_prefix, store.wait_for.join(", "));
        }
        if !store.fail_on.is_empty() {
            println!("   {}  ├─ fails on: {}", child_prefix, store.fail_on.join(", "));
        }
        let handles = if store.handles.is_empty() {
            "(all)".to_string()
        } else {
            store.handles.join(", ")
        };
        println!("   {}  └─ handles: {}", child_prefix, handles);
    }

    println!("\n📨 Actions ({})", blueprint.actions.len());
    if with_actions {
        for (i, action) in blueprint.actions.iter().enumerate() {
            let prefix = if i == blueprint.actions.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            if action.data.is_null() {
                println!("   {} #{} {}", prefix, i, action.kind);
            } else {
                println!("   {} #{} {} {}", prefix, i, action.kind, action.data);
            }
        }
    }

    println!();
}
