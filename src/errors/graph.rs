// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Construction-time misuse of the node graph.
//!
//! These are programming errors made while wiring nodes together. They are
//! returned synchronously from `connect`/`disconnect` and never mixed with
//! failures that happen while records are flowing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The target is already in the upstream node's edge list.
    #[error("Node '{downstream}' is already connected downstream of '{upstream}'")]
    DuplicateEdge { upstream: String, downstream: String },

    /// The target was never connected to the upstream node.
    #[error("Node '{downstream}' is not connected downstream of '{upstream}'")]
    EdgeNotFound { upstream: String, downstream: String },

    /// Edges can't change while the node is running.
    #[error("Cannot rewire node '{node}' while it is executing")]
    ExecutionInProgress { node: String },
}
