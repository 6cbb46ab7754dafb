// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph wiring events.

use crate::errors::GraphError;
use std::fmt::{Display, Formatter};

/// An edge was added.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use the_pipetree::observability::messages::graph::EdgeConnected;
///
/// let msg = EdgeConnected {
///     upstream: "ping#1",
///     downstream: "upper#2",
///     edge_count: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct EdgeConnected<'a> {
    pub upstream: &'a str,
    pub downstream: &'a str,
    pub edge_count: usize,
}

impl Display for EdgeConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Connected '{}' -> '{}' ({} edge(s) out of '{}')",
            self.upstream, self.downstream, self.edge_count, self.upstream
        )
    }
}

/// An edge was removed.
///
/// # Log Level
/// `debug!`
pub struct EdgeDisconnected<'a> {
    pub upstream: &'a str,
    pub downstream: &'a str,
    pub edge_count: usize,
}

impl Display for EdgeDisconnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Disconnected '{}' -> '{}' ({} edge(s) left)",
            self.upstream, self.downstream, self.edge_count
        )
    }
}

/// A wiring call was refused.
///
/// # Log Level
/// `warn!` - Construction-time misuse
pub struct EdgeRejected<'a> {
    pub error: &'a GraphError,
}

impl Display for EdgeRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected graph change: {}", self.error)
    }
}
