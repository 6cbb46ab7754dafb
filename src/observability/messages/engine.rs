// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node execution events.
//!
//! This module contains message types for logging events related to:
//! * Node execution lifecycle (start, completion, failure)
//! * Branch tasks spawned at fan-out points
//! * The tee detaching branches that stopped reading

use crate::engine::RunState;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Node execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_pipetree::observability::messages::engine::NodeExecutionStarted;
///
/// let msg = NodeExecutionStarted {
///     node: "ping#1",
///     unit: "process",
///     edge_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NodeExecutionStarted<'a> {
    pub node: &'a str,
    pub unit: &'a str,
    pub edge_count: usize,
}

impl Display for NodeExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.edge_count == 0 {
            write!(f, "Node '{}' started as leaf ({} unit)", self.node, self.unit)
        } else {
            write!(
                f,
                "Node '{}' started ({} unit), fanning out to {} branch(es)",
                self.node, self.unit, self.edge_count
            )
        }
    }
}

impl StructuredLog for NodeExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            unit = self.unit,
            edge_count = self.edge_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node",
            span_name = name,
            node = self.node,
            unit = self.unit,
            edge_count = self.edge_count,
        )
    }
}

/// Node execution completed successfully, including its whole subtree.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_pipetree::observability::messages::engine::NodeExecutionCompleted;
/// use std::time::Duration;
///
/// let msg = NodeExecutionCompleted {
///     node: "ping#1",
///     records_broadcast: Some(12),
///     duration: Duration::from_millis(250),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct NodeExecutionCompleted<'a> {
    pub node: &'a str,
    /// Records the tee copied to branches; `None` for leaves.
    pub records_broadcast: Option<usize>,
    pub duration: Duration,
}

impl Display for NodeExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.records_broadcast {
            Some(records) => write!(
                f,
                "Node '{}' completed in {:?}: {} record(s) broadcast",
                self.node, self.duration, records
            ),
            None => write!(f, "Node '{}' completed in {:?}", self.node, self.duration),
        }
    }
}

impl StructuredLog for NodeExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            records_broadcast = self.records_broadcast,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_completed",
            span_name = name,
            node = self.node,
            duration = ?self.duration,
        )
    }
}

/// Node execution failed; `causes` counts every leaf-level failure beneath it.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeExecutionFailed<'a> {
    pub node: &'a str,
    pub causes: usize,
    pub duration: Duration,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' failed after {:?} with {} cause(s): {}",
            self.node, self.duration, self.causes, self.error
        )
    }
}

impl StructuredLog for NodeExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            causes = self.causes,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node = self.node,
            causes = self.causes,
        )
    }
}

/// A branch task was spawned for a downstream node.
///
/// # Log Level
/// `debug!`
pub struct BranchSpawned<'a> {
    pub parent: &'a str,
    pub child: &'a str,
    pub channel_capacity: usize,
}

impl Display for BranchSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' spawned branch '{}' (channel capacity {})",
            self.parent, self.child, self.channel_capacity
        )
    }
}

/// The tee stopped feeding a branch whose input was dropped.
///
/// # Log Level
/// `debug!` - Expected whenever a unit stops reading early
pub struct BranchDetached<'a> {
    pub node: &'a str,
    pub branch: &'a str,
    pub records_delivered: usize,
}

impl Display for BranchDetached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' detached branch '{}' after {} record(s): branch stopped reading",
            self.node, self.branch, self.records_delivered
        )
    }
}

/// A node execution moved between states.
///
/// # Log Level
/// `trace!`
pub struct StateTransition<'a> {
    pub node: &'a str,
    pub from: RunState,
    pub to: RunState,
}

impl Display for StateTransition<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}': {} -> {}", self.node, self.from, self.to)
    }
}
