// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::UnitFailure;
use crate::streams::{RecordSink, RecordSource};
use crate::traits::Unit;

/// Drains its input, waits for a fixed delay and succeeds
pub struct DelayUnit {
    pub delay: Duration,
}

impl DelayUnit {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Unit for DelayUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        _output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        input.drain().await;
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "delay"
    }
}

/// Drains its input, then fails with the configured message
pub struct FailingUnit {
    pub message: String,
}

impl FailingUnit {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Unit for FailingUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        _output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        input.drain().await;
        errors.send(self.message.clone()).await?;
        Err(UnitFailure::Other(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Echoes the first `limit` records, then fails without reading further
pub struct FailAfterUnit {
    pub limit: usize,
}

impl FailAfterUnit {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Unit for FailAfterUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        for _ in 0..self.limit {
            match input.recv().await {
                Some(record) => output.send(record).await?,
                None => return Ok(()),
            }
        }
        Err(UnitFailure::Other(format!("gave up after {} records", self.limit)))
    }

    fn name(&self) -> &'static str {
        "fail_after"
    }
}

/// Reads only the first record of its input and then returns successfully
pub struct TakeOneUnit;

#[async_trait]
impl Unit for TakeOneUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        if let Some(record) = input.recv().await {
            output.send(record).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "take_one"
    }
}

/// Echo that counts how many times it was executed
#[derive(Default)]
pub struct CountingEchoUnit {
    pub runs: Arc<AtomicUsize>,
}

#[async_trait]
impl Unit for CountingEchoUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        while let Some(record) = input.recv().await {
            output.send(record).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "counting_echo"
    }
}

/// Panics as soon as it runs, to exercise task-abort reporting
pub struct PanickingUnit;

#[async_trait]
impl Unit for PanickingUnit {
    async fn execute(
        &self,
        _input: RecordSource,
        _output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        panic!("unit blew up")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
