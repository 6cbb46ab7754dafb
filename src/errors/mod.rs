// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod graph;
mod unit;
mod unit_factory;

pub use config::{ConfigError, ValidationError};
pub use execution::{CompositeFailure, ExecutionError};
pub use graph::GraphError;
pub use unit::UnitFailure;
pub use unit_factory::UnitFactoryError;
