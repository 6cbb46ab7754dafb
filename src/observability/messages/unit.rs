// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for unit-level events.
//!
//! This module contains message types for logging events related to:
//! * External process lifecycle (spawn, exit)
//! * Input a process stopped reading
//! * Records rejected by transform units

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::process::ExitStatus;
use tracing::Span;

/// External process spawned.
///
/// # Log Level
/// `debug!`
pub struct ProcessSpawned<'a> {
    pub command: &'a str,
    pub pid: Option<u32>,
}

impl Display for ProcessSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "Spawned `{}` (pid {})", self.command, pid),
            None => write!(f, "Spawned `{}`", self.command),
        }
    }
}

impl StructuredLog for ProcessSpawned<'_> {
    fn log(&self) {
        tracing::debug!(command = self.command, pid = self.pid, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("process", span_name = name, command = self.command, pid = self.pid)
    }
}

/// External process exited; logged at `warn!` when the status is a failure.
///
/// # Log Level
/// `debug!` on success, `warn!` otherwise
pub struct ProcessExited<'a> {
    pub command: &'a str,
    pub status: ExitStatus,
    pub records_out: usize,
}

impl Display for ProcessExited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "`{}` exited with {} after writing {} record(s)",
            self.command, self.status, self.records_out
        )
    }
}

impl StructuredLog for ProcessExited<'_> {
    fn log(&self) {
        if self.status.success() {
            tracing::debug!(command = self.command, records_out = self.records_out, "{}", self);
        } else {
            tracing::warn!(
                command = self.command,
                exit_code = self.status.code(),
                records_out = self.records_out,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "process_exited",
            span_name = name,
            command = self.command,
            exit_code = self.status.code(),
        )
    }
}

/// Process closed stdin before its input ended; the remainder was discarded.
///
/// # Log Level
/// `debug!` - Normal for programs that ignore stdin
pub struct StdinClosedEarly<'a> {
    pub command: &'a str,
    pub discarded: usize,
}

impl Display for StdinClosedEarly<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "`{}` stopped reading stdin; discarded {} remaining record(s)",
            self.command, self.discarded
        )
    }
}

/// A transform unit rejected a record and is aborting.
///
/// # Log Level
/// `warn!`
///
/// # Example
/// ```
/// use the_pipetree::observability::messages::unit::RecordRejected;
///
/// let msg = RecordRejected {
///     unit: "double",
///     record: "two",
///     reason: "invalid integer: two",
/// };
///
/// assert_eq!(msg.to_string(), "Unit 'double' rejected record \"two\": invalid integer: two");
/// ```
pub struct RecordRejected<'a> {
    pub unit: &'a str,
    pub record: &'a str,
    pub reason: &'a str,
}

impl Display for RecordRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' rejected record {:?}: {}",
            self.unit, self.record, self.reason
        )
    }
}
