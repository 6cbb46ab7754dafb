// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // unit implementations
pub mod config;     // pipeline files + runtime builder
pub mod engine;     // node graph + fan-out execution
pub mod errors;     // error handling
pub mod observability;
pub mod streams;    // record sources and sinks
pub mod traits;     // unified abstractions
