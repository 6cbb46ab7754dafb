// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failures reported by node execution.
//!
//! A leaf node reports its unit's failure as [`ExecutionError::Unit`]. A
//! fan-out node folds its own unit's failure and every failing branch into
//! one [`CompositeFailure`], so nothing that went wrong in a subtree is
//! lost by the time the result reaches the caller.

use std::fmt;
use thiserror::Error;

use super::UnitFailure;

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The unit owned by `node` failed.
    #[error("Node '{node}' failed: {source}")]
    Unit {
        node: String,
        #[source]
        source: UnitFailure,
    },

    /// A fan-out node collected one or more failures from itself and its branches.
    #[error(transparent)]
    Composite(#[from] CompositeFailure),

    /// The task running `node` ended without producing a result (panic or abort).
    #[error("Branch '{node}' did not complete: {reason}")]
    BranchAborted { node: String, reason: String },
}

impl ExecutionError {
    /// Every leaf-level failure in this error tree, depth first, in the order
    /// they were collected.
    pub fn unit_failures(&self) -> Vec<(&str, &UnitFailure)> {
        let mut found = Vec::new();
        self.collect_unit_failures(&mut found);
        found
    }

    /// Number of leaf-level causes, counting aborted branches.
    pub fn cause_count(&self) -> usize {
        match self {
            ExecutionError::Composite(composite) => {
                composite.causes.iter().map(ExecutionError::cause_count).sum()
            }
            _ => 1,
        }
    }

    fn collect_unit_failures<'a>(&'a self, found: &mut Vec<(&'a str, &'a UnitFailure)>) {
        match self {
            ExecutionError::Unit { node, source } => found.push((node.as_str(), source)),
            ExecutionError::Composite(composite) => {
                for cause in &composite.causes {
                    cause.collect_unit_failures(found);
                }
            }
            ExecutionError::BranchAborted { .. } => {}
        }
    }
}

/// Aggregate of every failure raised by a fan-out node and its subtree.
#[derive(Debug)]
pub struct CompositeFailure {
    /// Label of the fan-out node that collected the causes.
    pub node: String,
    pub causes: Vec<ExecutionError>,
}

impl fmt::Display for CompositeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node '{}' finished with {} failure(s): ",
            self.node,
            self.causes.len()
        )?;
        for (i, cause) in self.causes.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "[{}]", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_error(node: &str, message: &str) -> ExecutionError {
        ExecutionError::Unit {
            node: node.to_string(),
            source: UnitFailure::Other(message.to_string()),
        }
    }

    #[test]
    fn test_unit_failures_flattens_nested_composites() {
        let inner = CompositeFailure {
            node: "middle".to_string(),
            causes: vec![unit_error("leaf_b", "y"), unit_error("leaf_c", "z")],
        };
        let outer = ExecutionError::Composite(CompositeFailure {
            node: "root".to_string(),
            causes: vec![
                unit_error("root", "x"),
                ExecutionError::Composite(inner),
                ExecutionError::BranchAborted {
                    node: "leaf_d".to_string(),
                    reason: "panicked".to_string(),
                },
            ],
        });

        let nodes: Vec<&str> = outer.unit_failures().iter().map(|(n, _)| *n).collect();
        assert_eq!(nodes, vec!["root", "leaf_b", "leaf_c"]);
        assert_eq!(outer.cause_count(), 4);
    }

    #[test]
    fn test_composite_display_lists_every_cause() {
        let composite = CompositeFailure {
            node: "fan".to_string(),
            causes: vec![unit_error("a", "cause X"), unit_error("b", "cause Y")],
        };

        let rendered = composite.to_string();
        assert!(rendered.starts_with("Node 'fan' finished with 2 failure(s)"));
        assert!(rendered.contains("cause X"));
        assert!(rendered.contains("cause Y"));
    }
}
