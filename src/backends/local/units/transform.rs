// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::UnitFailure;
use crate::observability::messages::unit::RecordRejected;
use crate::streams::{Record, RecordSink, RecordSource};
use crate::traits::Unit;

/// Built-in per-record transforms, selectable from a pipeline file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Double,
    Upper,
    Lower,
}

type TransformFn = dyn Fn(&str) -> Result<Record, String> + Send + Sync;

/// Transform unit - maps each input record to exactly one output record.
///
/// A record the function rejects aborts the unit: the rejection message is
/// written to the error stream and the unit fails with
/// [`UnitFailure::InvalidRecord`]. Records emitted before the rejection
/// have already been delivered and stay delivered.
pub struct TransformUnit {
    name: &'static str,
    transform: Box<TransformFn>,
}

impl TransformUnit {
    pub fn new<F>(name: &'static str, transform: F) -> Self
    where
        F: Fn(&str) -> Result<Record, String> + Send + Sync + 'static,
    {
        Self {
            name,
            transform: Box::new(transform),
        }
    }

    pub fn from_kind(kind: TransformKind) -> Self {
        match kind {
            TransformKind::Double => Self::double(),
            TransformKind::Upper => Self::upper(),
            TransformKind::Lower => Self::lower(),
        }
    }

    /// Parses each record as a base-10 `i64` and emits twice its value.
    pub fn double() -> Self {
        Self::new("double", |record| {
            let number: i64 = record
                .parse()
                .map_err(|_| format!("invalid integer: {}", record))?;
            number
                .checked_mul(2)
                .map(|doubled| doubled.to_string())
                .ok_or_else(|| format!("integer overflow doubling: {}", record))
        })
    }

    pub fn upper() -> Self {
        Self::new("upper", |record| Ok(record.to_uppercase()))
    }

    pub fn lower() -> Self {
        Self::new("lower", |record| Ok(record.to_lowercase()))
    }
}

#[async_trait]
impl Unit for TransformUnit {
    async fn execute(
        &self,
        mut input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        while let Some(record) = input.recv().await {
            match (self.transform)(&record) {
                Ok(transformed) => output.send(transformed).await?,
                Err(reason) => {
                    tracing::warn!(
                        "{}",
                        RecordRejected {
                            unit: self.name,
                            record: &record,
                            reason: &reason,
                        }
                    );
                    errors.send(reason.clone()).await?;
                    return Err(UnitFailure::InvalidRecord { record, reason });
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(
        unit: TransformUnit,
        records: &[&str],
    ) -> (Result<(), UnitFailure>, Vec<Record>, Vec<Record>) {
        let (output, collected) = RecordSink::collector(16);
        let (errors, diagnostics) = RecordSink::collector(16);
        let result = unit
            .execute(RecordSource::from_records(records.iter().copied()), output, errors)
            .await;
        (result, collected.await.unwrap(), diagnostics.await.unwrap())
    }

    #[tokio::test]
    async fn test_double_emits_doubled_values() {
        let (result, output, errors) = run(TransformUnit::double(), &["1", "3", "5", "-4"]).await;

        assert!(result.is_ok());
        assert_eq!(output, vec!["2", "6", "10", "-8"]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_double_aborts_on_invalid_integer() {
        let (result, output, errors) = run(TransformUnit::double(), &["1", "two", "3"]).await;

        match result {
            Err(UnitFailure::InvalidRecord { record, .. }) => assert_eq!(record, "two"),
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
        assert_eq!(output, vec!["2"]);
        assert_eq!(errors, vec!["invalid integer: two"]);
    }

    #[tokio::test]
    async fn test_double_rejects_overflow() {
        let max = i64::MAX.to_string();
        let (result, output, _) = run(TransformUnit::double(), &[max.as_str()]).await;

        assert!(matches!(result, Err(UnitFailure::InvalidRecord { .. })));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_case_transforms() {
        let test_cases = vec![
            (TransformKind::Upper, "Hello World", "HELLO WORLD"),
            (TransformKind::Lower, "Hello World", "hello world"),
        ];

        for (kind, input, expected) in test_cases {
            let (result, output, _) = run(TransformUnit::from_kind(kind), &[input]).await;
            assert!(result.is_ok(), "Failed for kind: {:?}", kind);
            assert_eq!(output, vec![expected], "Failed for kind: {:?}", kind);
        }
    }

    #[test]
    fn test_names_follow_kind() {
        assert_eq!(TransformUnit::from_kind(TransformKind::Double).name(), "double");
        assert_eq!(TransformUnit::from_kind(TransformKind::Upper).name(), "upper");
        assert_eq!(TransformUnit::from_kind(TransformKind::Lower).name(), "lower");
    }
}
