//! Pipeline validation.
//!
//! Checks a [`PipelineConfig`] before any unit is created, so a broken file
//! is rejected as a whole with every problem listed, instead of failing on
//! the first bad unit half-way through building the graph.
//!
//! # Checks
//!
//! 1. **Non-empty**: at least one unit is declared
//! 2. **Unique IDs**: no two units share an `id`
//! 3. **Pipe targets**: every `pipe_to` entry names an existing unit, once
//! 4. **Required fields**: each unit carries the fields its `type` needs
//! 5. **Single root**: exactly one unit has no upstream
//! 6. **Acyclic**: no chain of `pipe_to` leads back to a unit on it
//!
//! Checks 2 to 5 all run and their errors are accumulated. The cycle check
//! runs only when IDs and pipe targets are valid, since it walks the graph
//! those describe. A cycle below the root would otherwise spawn branches
//! forever once executed.
//!
//! # Example
//!
//! ```rust
//! use the_pipetree::config::{validate_pipeline, PipelineConfig};
//! use the_pipetree::errors::ValidationError;
//!
//! let config: PipelineConfig = serde_yaml::from_str(r#"
//! units:
//!   - id: source
//!     type: echo
//!     pipe_to: [sink, nowhere]
//!   - id: sink
//!     type: transform
//! "#).unwrap();
//!
//! let errors = validate_pipeline(&config).unwrap_err();
//! assert!(errors.contains(&ValidationError::UnresolvedTarget {
//!     unit_id: "source".to_string(),
//!     missing_target: "nowhere".to_string(),
//! }));
//! assert!(errors.contains(&ValidationError::MissingField {
//!     unit_id: "sink".to_string(),
//!     field: "transform",
//! }));
//! ```

use std::collections::{HashMap, HashSet};

use crate::config::{PipelineConfig, UnitConfig, UnitKind};
use crate::errors::ValidationError;

/// Validate a pipeline definition, returning every problem found.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    if config.units.is_empty() {
        return Err(vec![ValidationError::EmptyPipeline]);
    }

    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_unit_ids(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(target_errors) = validate_pipe_targets(config) {
        errors.extend(target_errors);
    }

    let structural_errors = !errors.is_empty();

    if let Err(field_errors) = validate_required_fields(config) {
        errors.extend(field_errors);
    }

    if let Err(root_error) = find_root(config) {
        errors.push(root_error);
    }

    if !structural_errors {
        if let Err(cycle_error) = validate_acyclic(config) {
            errors.push(cycle_error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The id of the only unit that nothing pipes into.
pub fn find_root(config: &PipelineConfig) -> Result<&str, ValidationError> {
    let downstream: HashSet<&str> = config
        .units
        .iter()
        .flat_map(|unit| unit.pipe_to.iter().map(String::as_str))
        .collect();

    let mut seen = HashSet::new();
    let roots: Vec<&str> = config
        .units
        .iter()
        .map(|unit| unit.id.as_str())
        .filter(|id| !downstream.contains(id) && seen.insert(*id))
        .collect();

    match roots.as_slice() {
        [] => Err(ValidationError::NoRoot),
        [root] => Ok(*root),
        _ => Err(ValidationError::MultipleRoots {
            roots: roots.iter().map(|root| root.to_string()).collect(),
        }),
    }
}

fn validate_unique_unit_ids(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for unit in &config.units {
        if !seen_ids.insert(&unit.id) {
            errors.push(ValidationError::DuplicateUnitId {
                unit_id: unit.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pipe_targets(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let unit_ids: HashSet<&str> = config.units.iter().map(|unit| unit.id.as_str()).collect();
    let mut errors = Vec::new();

    for unit in &config.units {
        let mut targets = HashSet::new();
        for target in &unit.pipe_to {
            if !unit_ids.contains(target.as_str()) {
                errors.push(ValidationError::UnresolvedTarget {
                    unit_id: unit.id.clone(),
                    missing_target: target.clone(),
                });
            } else if !targets.insert(target.as_str()) {
                errors.push(ValidationError::DuplicatePipe {
                    unit_id: unit.id.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Depth-first search over `pipe_to` edges, in declaration order.
///
/// A unit is on the stack while its descendants are being explored; reaching
/// a unit that is still on the stack closes a cycle.
fn validate_acyclic(config: &PipelineConfig) -> Result<(), ValidationError> {
    let targets: HashMap<&str, &[String]> = config
        .units
        .iter()
        .map(|unit| (unit.id.as_str(), unit.pipe_to.as_slice()))
        .collect();
    let mut finished = HashSet::new();
    let mut path = Vec::new();

    for unit in &config.units {
        if let Some(cycle) = find_cycle(&unit.id, &targets, &mut finished, &mut path) {
            return Err(ValidationError::Cycle { path: cycle });
        }
    }
    Ok(())
}

fn find_cycle<'a>(
    unit: &'a str,
    targets: &HashMap<&'a str, &'a [String]>,
    finished: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if finished.contains(unit) {
        return None;
    }
    if let Some(start) = path.iter().position(|on_path| *on_path == unit) {
        let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
        cycle.push(unit.to_string());
        return Some(cycle);
    }

    path.push(unit);
    for target in targets.get(unit).copied().unwrap_or_default() {
        if let Some(cycle) = find_cycle(target, targets, finished, path) {
            return Some(cycle);
        }
    }
    path.pop();
    finished.insert(unit);
    None
}

fn validate_required_fields(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = config
        .units
        .iter()
        .filter_map(|unit| {
            missing_field(unit).map(|field| ValidationError::MissingField {
                unit_id: unit.id.clone(),
                field,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn missing_field(unit: &UnitConfig) -> Option<&'static str> {
    match unit.kind {
        UnitKind::Echo => None,
        UnitKind::Transform => unit.transform.is_none().then_some("transform"),
        UnitKind::Counter => unit.count.is_none().then_some("count"),
        UnitKind::Process => {
            let has_command = unit
                .command
                .as_deref()
                .map_or(false, |command| !command.trim().is_empty());
            (!has_command).then_some("command")
        }
    }
}
