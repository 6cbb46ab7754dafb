// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for unit instantiation from pipeline configuration.

use crate::config::UnitKind;
use std::error::Error;
use std::fmt;

/// Errors that can occur while creating a unit from its configuration
#[derive(Debug, Clone, PartialEq)]
pub enum UnitFactoryError {
    /// A unit kind needs a field that was not supplied
    MissingField {
        unit_id: String,
        kind: UnitKind,
        field: &'static str,
    },

    /// A field was supplied but its value can't be used
    InvalidOption {
        unit_id: String,
        kind: UnitKind,
        reason: String,
    },
}

impl fmt::Display for UnitFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitFactoryError::MissingField {
                unit_id,
                kind,
                field,
            } => {
                write!(
                    f,
                    "Cannot create {} unit '{}': missing '{}'",
                    kind, unit_id, field
                )
            }
            UnitFactoryError::InvalidOption {
                unit_id,
                kind,
                reason,
            } => {
                write!(f, "Cannot create {} unit '{}': {}", kind, unit_id, reason)
            }
        }
    }
}

impl Error for UnitFactoryError {}
