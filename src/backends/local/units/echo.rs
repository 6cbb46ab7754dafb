// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::UnitFailure;
use crate::streams::{RecordSink, RecordSource};
use crate::traits::Unit;

/// Echo unit - copies every input record to output unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoUnit;

impl EchoUnit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Unit for EchoUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        output: RecordSink,
        _errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        while let Some(record) = input.recv().await {
            output.send(record).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}
