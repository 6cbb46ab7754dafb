// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::UnitFailure;
use crate::streams::{RecordSink, RecordSource};
use crate::traits::Unit;

/// Counter unit - a source that ignores its input and emits `1..=count`,
/// optionally pausing after each record
#[derive(Debug, Clone)]
pub struct CounterUnit {
    count: u64,
    delay: Option<Duration>,
}

impl CounterUnit {
    pub fn new(count: u64) -> Self {
        Self { count, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Unit for CounterUnit {
    async fn execute(
        &self,
        _input: RecordSource,
        output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        for n in 1..=self.count {
            output.send(n.to_string()).await?;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}
