// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides the message types for all diagnostic and operational
//! logging in The Pipetree. Message types follow a struct-based pattern with
//! a `Display` implementation, which keeps log wording in one place instead
//! of scattering format strings through the engine.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - node execution lifecycle, branches and the tee
//! * `messages::graph` - edge wiring
//! * `messages::unit` - external process lifecycle and rejected records
//! * `messages::config` - pipeline file loading and graph building
//!
//! # Usage
//!
//! ```rust
//! use the_pipetree::observability::messages::unit::RecordRejected;
//!
//! let msg = RecordRejected {
//!     unit: "double",
//!     record: "two",
//!     reason: "invalid integer: two",
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

pub mod messages;
