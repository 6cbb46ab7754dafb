// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution engine: nodes, fan-out and failure aggregation.
//!
//! A [`Node`] runs its unit on the caller's task. When it has edges, each
//! downstream node runs on a task of its own, fed through a bounded channel
//! by a tee that copies every record the unit produces. Closing the unit's
//! output closes every branch input, so end-of-stream propagates through
//! the whole tree without extra signalling.

mod node;
mod state;
mod tee;


pub use node::Node;
pub use state::RunState;
