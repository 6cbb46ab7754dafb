// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline loading and graph building.

use std::fmt::{Display, Formatter};

/// Pipeline file parsed and validated.
///
/// # Log Level
/// `info!`
pub struct PipelineLoaded<'a> {
    pub path: &'a str,
    pub unit_count: usize,
}

impl Display for PipelineLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded pipeline '{}' with {} unit(s)", self.path, self.unit_count)
    }
}

/// Node graph built from a pipeline definition.
///
/// # Log Level
/// `debug!`
pub struct GraphBuilt<'a> {
    pub root: &'a str,
    pub node_count: usize,
    pub edge_count: usize,
}

impl Display for GraphBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built graph rooted at '{}': {} node(s), {} edge(s)",
            self.root, self.node_count, self.edge_count
        )
    }
}

/// A unit failure reported to the operator after execution.
///
/// # Log Level
/// `error!`
pub struct FailureReported<'a> {
    pub node: &'a str,
    pub failure: &'a dyn std::error::Error,
}

impl Display for FailureReported<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' contributed failure: {}", self.node, self.failure)
    }
}

/// Reading the pipeline's input failed, so the root saw a truncated stream.
///
/// # Log Level
/// `error!`
pub struct InputReadFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for InputReadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reading pipeline input failed, input was truncated: {}", self.error)
    }
}
