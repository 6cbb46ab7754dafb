// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

use super::{GraphError, UnitFactoryError};

/// Errors that can occur during pipeline definition validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The pipeline declares no units at all
    EmptyPipeline,
    /// A unit has a duplicate ID
    DuplicateUnitId {
        /// The duplicate unit ID
        unit_id: String,
    },
    /// A unit pipes to a target that doesn't exist
    UnresolvedTarget {
        /// The unit declaring the pipe
        unit_id: String,
        /// The target that couldn't be resolved
        missing_target: String,
    },
    /// A unit lists the same target twice in `pipe_to`
    DuplicatePipe {
        /// The unit declaring the pipe
        unit_id: String,
        /// The repeated target
        target: String,
    },
    /// Every unit has an upstream, so there is nothing to start from
    NoRoot,
    /// More than one unit has no upstream
    MultipleRoots {
        /// The units without an upstream, in declaration order
        roots: Vec<String>,
    },
    /// Following `pipe_to` from a unit leads back to it
    Cycle {
        /// Units on the cycle, starting and ending with the same unit
        path: Vec<String>,
    },
    /// A unit is missing a field its type requires
    MissingField {
        /// The unit lacking the field
        unit_id: String,
        /// Name of the missing field
        field: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPipeline => write!(f, "Pipeline declares no units"),
            ValidationError::DuplicateUnitId { unit_id } => {
                write!(f, "Duplicate unit ID: '{}'", unit_id)
            }
            ValidationError::UnresolvedTarget {
                unit_id,
                missing_target,
            } => {
                write!(
                    f,
                    "Unit '{}' pipes to '{}' which does not exist",
                    unit_id, missing_target
                )
            }
            ValidationError::DuplicatePipe { unit_id, target } => {
                write!(f, "Unit '{}' pipes to '{}' more than once", unit_id, target)
            }
            ValidationError::NoRoot => {
                write!(f, "Pipeline has no root: every unit has an upstream")
            }
            ValidationError::MultipleRoots { roots } => {
                write!(
                    f,
                    "Pipeline has more than one root: {}",
                    roots.join(", ")
                )
            }
            ValidationError::Cycle { path } => {
                write!(f, "Pipeline contains a cycle: {}", path.join(" -> "))
            }
            ValidationError::MissingField { unit_id, field } => {
                write!(f, "Unit '{}' is missing required field '{}'", unit_id, field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline file and turning it into a node graph
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read pipeline file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pipeline file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(
        "Pipeline validation failed:\n{}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    )]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    UnitCreation(#[from] UnitFactoryError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
