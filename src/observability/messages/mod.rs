// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output. The
//! ones that mark lifecycle boundaries also implement [`StructuredLog`], which
//! emits the message with its fields attached and can open a matching span.
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_pipetree::observability::messages::engine::NodeExecutionStarted;
//! use the_pipetree::observability::messages::StructuredLog;
//!
//! let msg = NodeExecutionStarted {
//!     node: "ping#1",
//!     unit: "process",
//!     edge_count: 2,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod config;
pub mod engine;
pub mod graph;
pub mod unit;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
