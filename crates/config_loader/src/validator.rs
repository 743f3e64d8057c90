//! Scenario validation
//!
//! Rules:
//! - field rules declared on the blueprint types (non-empty names and kinds)
//! - store names unique
//! - every `wait_for` entry names a known store other than itself
//!
//! Dependency cycles are legal (the dispatcher reports them at runtime);
//! [`find_dependency_cycle`] lets callers warn about them up front.

use std::collections::{HashMap, HashSet};

use ::validator::Validate;
use contracts::{ContractError, ScenarioBlueprint};

/// Validate a ScenarioBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &ScenarioBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_store_names(blueprint)?;
    validate_dependencies(blueprint)?;
    Ok(())
}

fn validate_fields(blueprint: &ScenarioBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

fn validate_store_names(blueprint: &ScenarioBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for store in &blueprint.stores {
        if !seen.insert(store.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("stores[name={}]", store.name),
                "duplicate store name",
            ));
        }
    }
    Ok(())
}

fn validate_dependencies(blueprint: &ScenarioBlueprint) -> Result<(), ContractError> {
    let names: HashSet<_> = blueprint.stores.iter().map(|s| s.name.as_str()).collect();

    for store in &blueprint.stores {
        for dep in &store.wait_for {
            if dep == &store.name {
                return Err(ContractError::config_validation(
                    format!("stores[{}].wait_for", store.name),
                    "store cannot wait for itself",
                ));
            }
            if !names.contains(dep.as_str()) {
                return Err(ContractError::config_validation(
                    format!("stores[{}].wait_for", store.name),
                    format!("unknown store '{dep}'"),
                ));
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// First static dependency cycle, as a path that starts and ends on the same
/// store (e.g. `["a", "b", "a"]`). Unknown dependencies are ignored.
pub fn find_dependency_cycle(blueprint: &ScenarioBlueprint) -> Option<Vec<String>> {
    let edges: HashMap<&str, Vec<&str>> = blueprint
        .stores
        .iter()
        .map(|s| (s.name.as_str(), s.wait_for.iter().map(String::as_str).collect()))
        .collect();

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for store in &blueprint.stores {
        if let Some(cycle) = visit(store.name.as_str(), &edges, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(node) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        None => {}
    }

    let deps = edges.get(node)?;

    marks.insert(node, Mark::Visiting);
    path.push(node);
    for &dep in deps {
        if let Some(cycle) = visit(dep, edges, marks, path) {
            return Some(cycle);
        }
    }
    path.pop();
    marks.insert(node, Mark::Done);
    None
}
