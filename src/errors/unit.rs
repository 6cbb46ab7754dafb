// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::process::ExitStatus;
use thiserror::Error;

/// Operational failure of a single unit.
///
/// Every unit variant reports through this type, so the engine can treat
/// echo, transform and process units alike.
#[derive(Error, Debug)]
pub enum UnitFailure {
    /// A record could not be interpreted by the unit.
    #[error("Invalid record {record:?}: {reason}")]
    InvalidRecord { record: String, reason: String },

    /// The external program could not be started.
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}")]
    ProcessExit { command: String, status: ExitStatus },

    /// Reading or writing one of the unit's own streams failed.
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The consumer of an output stream went away.
    #[error("Output stream closed by its consumer")]
    SinkClosed,

    #[error("{0}")]
    Other(String),
}

impl UnitFailure {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
