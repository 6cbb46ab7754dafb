// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unit backend implementations for The Pipetree.
//!
//! Every backend implements the `Unit` trait, so the engine never needs to
//! know which kind of unit a node owns.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process units:
//! - **Echo**: identity copy of the input stream
//! - **Transform**: one record in, one record out (`double`, `upper`, `lower`)
//! - **Counter**: a source emitting `1..=n`, optionally paced
//!
//! ## Process Backend
//! Runs an external program with its standard streams attached to the
//! unit's streams. Success is decided by the exit status.
//!
//! ## Stub Backend (Test-Only)
//! Units that sleep, fail, fail part-way or panic, used to exercise the
//! engine's synchronization and error aggregation. Not available in
//! production builds.
//!
//! # Examples
//!
//! ```rust
//! use the_pipetree::backends::local::LocalUnitFactory;
//! use the_pipetree::config::{UnitConfig, UnitKind};
//!
//! let config = UnitConfig {
//!     id: "mirror".to_string(),
//!     kind: UnitKind::Echo,
//!     transform: None,
//!     count: None,
//!     delay_ms: None,
//!     command: None,
//!     args: vec![],
//!     pipe_to: vec![],
//! };
//!
//! let unit = LocalUnitFactory::create_unit(&config)?;
//! assert_eq!(unit.name(), "echo");
//! # Ok::<(), the_pipetree::errors::UnitFactoryError>(())
//! ```

pub mod local;
pub mod process;
#[cfg(test)]
pub mod stub;
