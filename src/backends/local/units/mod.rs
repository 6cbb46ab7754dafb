// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod counter;
pub mod echo;
pub mod transform;

pub use counter::CounterUnit;
pub use echo::EchoUnit;
pub use transform::{TransformKind, TransformUnit};
