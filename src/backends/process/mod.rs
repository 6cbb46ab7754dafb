// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! External-process backend.
//!
//! [`ProcessUnit`] runs a program with its standard streams attached to the
//! unit's streams: input records are written to stdin as lines, stdout and
//! stderr are split back into records. The program's exit status decides
//! success; output it produced before failing is kept.

mod unit;

pub use unit::ProcessUnit;
