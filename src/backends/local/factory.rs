// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use super::units::*;
use crate::config::{UnitConfig, UnitKind};
use crate::errors::UnitFactoryError;
use crate::traits::Unit;

/// Factory for creating local (in-process) unit instances
pub struct LocalUnitFactory;

impl LocalUnitFactory {
    /// Create a unit instance from configuration
    ///
    /// The `type` field in the config determines which unit to create:
    /// - "echo" -> EchoUnit
    /// - "transform" -> TransformUnit (requires `transform`)
    /// - "counter" -> CounterUnit (requires `count`, honours `delay_ms`)
    pub fn create_unit(config: &UnitConfig) -> Result<Arc<dyn Unit>, UnitFactoryError> {
        match config.kind {
            UnitKind::Echo => Ok(Arc::new(EchoUnit::new())),

            UnitKind::Transform => {
                let kind = config.transform.ok_or_else(|| UnitFactoryError::MissingField {
                    unit_id: config.id.clone(),
                    kind: config.kind,
                    field: "transform",
                })?;
                Ok(Arc::new(TransformUnit::from_kind(kind)))
            }

            UnitKind::Counter => {
                let count = config.count.ok_or_else(|| UnitFactoryError::MissingField {
                    unit_id: config.id.clone(),
                    kind: config.kind,
                    field: "count",
                })?;
                let mut counter = CounterUnit::new(count);
                if let Some(delay_ms) = config.delay_ms {
                    counter = counter.with_delay(Duration::from_millis(delay_ms));
                }
                Ok(Arc::new(counter))
            }

            UnitKind::Process => Err(UnitFactoryError::InvalidOption {
                unit_id: config.id.clone(),
                kind: config.kind,
                reason: "process units are not local".to_string(),
            }),
        }
    }

    /// List all unit kinds this factory can build
    pub fn list_available_kinds() -> Vec<UnitKind> {
        vec![UnitKind::Echo, UnitKind::Transform, UnitKind::Counter]
    }

    /// Check if a kind is built in-process
    pub fn is_local(kind: UnitKind) -> bool {
        Self::list_available_kinds().contains(&kind)
    }
}
