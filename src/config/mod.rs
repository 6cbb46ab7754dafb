// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use crate::backends::local::TransformKind;
pub use loader::{
    load_and_validate_config, load_config, PipelineConfig, RootInput, UnitConfig, UnitKind,
};
pub use runtime::{Pipeline, RuntimeBuilder};
pub use validation::{find_root, validate_pipeline};
