// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::local::LocalUnitFactory;
use crate::backends::process::ProcessUnit;
use crate::config::{find_root, validate_pipeline, PipelineConfig, RootInput, UnitConfig, UnitKind};
use crate::engine::Node;
use crate::errors::{ConfigError, ExecutionError, UnitFactoryError, ValidationError};
use crate::observability::messages::config::GraphBuilt;
use crate::streams::{RecordSink, RecordSource};
use crate::traits::Unit;

/// Pipeline builder - turns a pipeline definition into a wired node graph.
///
/// Units are created in declaration order, each wrapped in a node labelled
/// with its id, and edges are connected in `pipe_to` order so branch order
/// follows the file.
///
/// # Example
/// ```
/// use the_pipetree::config::{PipelineConfig, RuntimeBuilder};
///
/// let config: PipelineConfig = serde_yaml::from_str(r#"
/// units:
///   - id: numbers
///     type: counter
///     count: 3
///     pipe_to: [double]
///   - id: double
///     type: transform
///     transform: double
/// "#).unwrap();
///
/// let pipeline = RuntimeBuilder::from_config(&config).unwrap();
///
/// assert_eq!(pipeline.root().label(), "numbers");
/// assert_eq!(pipeline.len(), 2);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Validate `cfg`, create every unit and wire the nodes.
    pub fn from_config(cfg: &PipelineConfig) -> Result<Pipeline, ConfigError> {
        validate_pipeline(cfg).map_err(ConfigError::Invalid)?;
        let root_id = find_root(cfg).map_err(|error| ConfigError::Invalid(vec![error]))?;
        let capacity = cfg.channel_capacity();

        let mut nodes = HashMap::with_capacity(cfg.units.len());
        for unit_config in &cfg.units {
            let unit = Self::create_unit(unit_config)?;
            let node = Node::with_options(unit_config.id.clone(), unit, capacity);
            nodes.insert(unit_config.id.clone(), node);
        }

        let mut edge_count = 0;
        for unit_config in &cfg.units {
            let Some(upstream) = nodes.get(&unit_config.id) else {
                continue;
            };
            for target in &unit_config.pipe_to {
                if let Some(downstream) = nodes.get(target) {
                    upstream.connect(downstream)?;
                    edge_count += 1;
                }
            }
        }

        let root = nodes
            .get(root_id)
            .cloned()
            .ok_or(ConfigError::Invalid(vec![ValidationError::NoRoot]))?;

        tracing::info!(
            "{}",
            GraphBuilt {
                root: root.label(),
                node_count: nodes.len(),
                edge_count,
            }
        );

        Ok(Pipeline {
            root,
            nodes,
            root_input: cfg.root_input,
            channel_capacity: capacity,
        })
    }

    fn create_unit(config: &UnitConfig) -> Result<Arc<dyn Unit>, UnitFactoryError> {
        match config.kind {
            UnitKind::Process => Ok(Arc::new(ProcessUnit::from_config(config)?)),
            _ => LocalUnitFactory::create_unit(config),
        }
    }
}

/// A wired node graph ready to run.
pub struct Pipeline {
    root: Node,
    nodes: HashMap<String, Node>,
    root_input: RootInput,
    channel_capacity: usize,
}

impl Pipeline {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_input(&self) -> RootInput {
        self.root_input
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Execute the whole graph from its root.
    pub async fn run(
        &self,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), ExecutionError> {
        self.root.execute(input, output, errors).await
    }
}
