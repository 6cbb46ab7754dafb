// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Lifecycle of a single node execution.
///
/// ```text
/// NotStarted -> Running -> Succeeded
///                       \-> Failed
/// ```
///
/// A node that is executed again (a second run, or a second incoming path in
/// a DAG) gets a fresh state; states are never reused across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn can_transition_to(self, target: RunState) -> bool {
        matches!(
            (self, target),
            (RunState::NotStarted, RunState::Running)
                | (RunState::Running, RunState::Succeeded)
                | (RunState::Running, RunState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        RunState::NotStarted
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
