// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::Instrument;

use super::state::RunState;
use super::tee::{self, Tap};
use crate::config::consts::DEFAULT_CHANNEL_CAPACITY;
use crate::errors::{CompositeFailure, ExecutionError, GraphError};
use crate::observability::messages::engine::{
    BranchSpawned, NodeExecutionCompleted, NodeExecutionFailed, NodeExecutionStarted,
    StateTransition,
};
use crate::observability::messages::graph::{EdgeConnected, EdgeDisconnected, EdgeRejected};
use crate::observability::messages::StructuredLog;
use crate::streams::{self, RecordSink, RecordSource};
use crate::traits::Unit;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A unit plus the ordered list of nodes its output is piped to.
///
/// `Node` is a cheap handle: clones refer to the same node, and equality is
/// identity. A node with no edges is a leaf and writes straight into the
/// output it is executed with; otherwise every record its unit produces is
/// copied to each downstream node, each running on its own task.
///
/// # Example
/// ```
/// use the_pipetree::backends::local::{EchoUnit, TransformUnit};
/// use the_pipetree::engine::Node;
/// use the_pipetree::streams::{RecordSink, RecordSource};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = Node::named("root", EchoUnit::new());
/// root.connect(&Node::named("upper", TransformUnit::upper()))?
///     .connect(&Node::named("lower", TransformUnit::lower()))?;
///
/// let (output, collected) = RecordSink::collector(16);
/// let (errors, _) = RecordSink::collector(16);
/// root.execute(RecordSource::from_records(["Hello"]), output, errors).await?;
///
/// assert_eq!(collected.await.unwrap(), vec!["hello"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    label: String,
    unit: Arc<dyn Unit>,
    channel_capacity: usize,
    edges: RwLock<Vec<Node>>,
    active_runs: AtomicUsize,
}

impl Node {
    /// Wrap `unit` in a node labelled after the unit's name.
    pub fn new<U: Unit + 'static>(unit: U) -> Self {
        Self::from_unit(Arc::new(unit))
    }

    /// Like [`Node::new`], for a unit that is already shared.
    pub fn from_unit(unit: Arc<dyn Unit>) -> Self {
        let id = NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed);
        let label = format!("{}#{}", unit.name(), id);
        Self::with_options(label, unit, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Wrap `unit` in a node with an explicit label, used in logs and errors.
    pub fn named<U: Unit + 'static>(label: impl Into<String>, unit: U) -> Self {
        Self::with_options(label, Arc::new(unit), DEFAULT_CHANNEL_CAPACITY)
    }

    /// `channel_capacity` bounds each branch channel created when this node
    /// fans out.
    pub fn with_options(label: impl Into<String>, unit: Arc<dyn Unit>, channel_capacity: usize) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                label: label.into(),
                unit,
                channel_capacity: channel_capacity.max(1),
                edges: RwLock::new(Vec::new()),
                active_runs: AtomicUsize::new(0),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn unit_name(&self) -> &'static str {
        self.inner.unit.name()
    }

    pub fn channel_capacity(&self) -> usize {
        self.inner.channel_capacity
    }

    /// Snapshot of the downstream nodes, in connection order.
    pub fn edges(&self) -> Vec<Node> {
        self.inner
            .edges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn edge_count(&self) -> usize {
        self.inner
            .edges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_leaf(&self) -> bool {
        self.edge_count() == 0
    }

    pub fn is_connected_to(&self, target: &Node) -> bool {
        self.inner
            .edges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    /// True while at least one execution of this node is in flight.
    pub fn is_running(&self) -> bool {
        self.inner.active_runs.load(Ordering::SeqCst) > 0
    }

    /// Pipe this node's output into `target`.
    ///
    /// Returns `target` so chains read left to right:
    /// `a.connect(&b)?.connect(&c)?` wires `a -> b -> c`. Connecting the same
    /// target twice leaves a single edge and reports `DuplicateEdge`.
    pub fn connect(&self, target: &Node) -> Result<Node, GraphError> {
        self.ensure_idle()?;

        let mut edges = self.inner.edges.write().unwrap_or_else(PoisonError::into_inner);
        if edges.contains(target) {
            drop(edges);
            return self.reject(GraphError::DuplicateEdge {
                upstream: self.label().to_string(),
                downstream: target.label().to_string(),
            });
        }
        edges.push(target.clone());
        let edge_count = edges.len();
        drop(edges);

        tracing::debug!(
            "{}",
            EdgeConnected {
                upstream: self.label(),
                downstream: target.label(),
                edge_count,
            }
        );
        Ok(target.clone())
    }

    /// Remove the edge to `target`, keeping the order of the others.
    pub fn disconnect(&self, target: &Node) -> Result<(), GraphError> {
        self.ensure_idle()?;

        let mut edges = self.inner.edges.write().unwrap_or_else(PoisonError::into_inner);
        let Some(position) = edges.iter().position(|edge| edge == target) else {
            drop(edges);
            return self.reject(GraphError::EdgeNotFound {
                upstream: self.label().to_string(),
                downstream: target.label().to_string(),
            });
        };
        edges.remove(position);
        let edge_count = edges.len();
        drop(edges);

        tracing::debug!(
            "{}",
            EdgeDisconnected {
                upstream: self.label(),
                downstream: target.label(),
                edge_count,
            }
        );
        Ok(())
    }

    /// Run this node and everything downstream of it.
    ///
    /// Leaves write into `output` and every unit shares `errors`. The
    /// returned future completes only after every descendant has finished,
    /// and it reports every failure in the subtree rather than the first.
    /// `input` must eventually be closed or the run never ends.
    pub fn execute(
        &self,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> BoxFuture<'static, Result<(), ExecutionError>> {
        self.clone().run(input, output, errors).boxed()
    }

    async fn run(self, input: RecordSource, output: RecordSink, errors: RecordSink) -> Result<(), ExecutionError> {
        let edges = self.edges();
        let span = NodeExecutionStarted {
            node: self.label(),
            unit: self.unit_name(),
            edge_count: edges.len(),
        }
        .span("execute");

        self.run_in_span(edges, input, output, errors)
            .instrument(span)
            .await
    }

    async fn run_in_span(
        &self,
        edges: Vec<Node>,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), ExecutionError> {
        let mut run = ActiveRun::begin(self);
        NodeExecutionStarted {
            node: self.label(),
            unit: self.unit_name(),
            edge_count: edges.len(),
        }
        .log();
        let started = Instant::now();

        let (result, records_broadcast) = if edges.is_empty() {
            let result = self
                .inner
                .unit
                .execute(input, output, errors)
                .await
                .map_err(|source| ExecutionError::Unit {
                    node: self.label().to_string(),
                    source,
                });
            (result, None)
        } else {
            let (result, records) = self.fan_out(edges, input, output, errors).await;
            (result, Some(records))
        };

        let duration = started.elapsed();
        match &result {
            Ok(()) => {
                run.advance(RunState::Succeeded);
                NodeExecutionCompleted {
                    node: self.label(),
                    records_broadcast,
                    duration,
                }
                .log();
            }
            Err(error) => {
                run.advance(RunState::Failed);
                NodeExecutionFailed {
                    node: self.label(),
                    causes: error.cause_count(),
                    duration,
                    error,
                }
                .log();
            }
        }
        result
    }

    /// Spawn one task per edge, tee the unit's output into them and wait
    /// for the unit and every branch.
    async fn fan_out(
        &self,
        edges: Vec<Node>,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> (Result<(), ExecutionError>, usize) {
        let capacity = self.channel_capacity();
        let mut taps = Vec::with_capacity(edges.len());
        let mut branches = Vec::with_capacity(edges.len());

        for child in edges {
            let (tap, branch_input) = streams::channel(capacity);
            tracing::debug!(
                "{}",
                BranchSpawned {
                    parent: self.label(),
                    child: child.label(),
                    channel_capacity: capacity,
                }
            );
            let branch = tokio::spawn(
                child
                    .execute(branch_input, output.clone(), errors.clone())
                    .in_current_span(),
            );
            taps.push(Tap::new(child.label(), tap));
            branches.push((child.label().to_string(), branch));
        }
        // only the leaves may keep the final output open
        drop(output);

        let (unit_output, unit_records) = streams::channel(capacity);
        let (unit_result, records) = tokio::join!(
            self.inner.unit.execute(input, unit_output, errors),
            tee::broadcast(self.label(), unit_records, taps),
        );

        let mut causes = Vec::new();
        if let Err(source) = unit_result {
            causes.push(ExecutionError::Unit {
                node: self.label().to_string(),
                source,
            });
        }
        for (branch, handle) in branches {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => causes.push(error),
                Err(join_error) => causes.push(ExecutionError::BranchAborted {
                    node: branch,
                    reason: join_error.to_string(),
                }),
            }
        }

        let result = if causes.is_empty() {
            Ok(())
        } else {
            Err(CompositeFailure {
                node: self.label().to_string(),
                causes,
            }
            .into())
        };
        (result, records)
    }

    fn ensure_idle(&self) -> Result<(), GraphError> {
        if self.is_running() {
            return self.reject(GraphError::ExecutionInProgress {
                node: self.label().to_string(),
            });
        }
        Ok(())
    }

    fn reject<T>(&self, error: GraphError) -> Result<T, GraphError> {
        tracing::warn!("{}", EdgeRejected { error: &error });
        Err(error)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<String> = self.edges().iter().map(|edge| edge.label().to_string()).collect();
        f.debug_struct("Node")
            .field("label", &self.inner.label)
            .field("unit", &self.unit_name())
            .field("edges", &edges)
            .finish()
    }
}

/// Marks a node as running for as long as it lives and tracks the state of
/// that one execution.
struct ActiveRun<'a> {
    node: &'a Node,
    state: RunState,
}

impl<'a> ActiveRun<'a> {
    fn begin(node: &'a Node) -> Self {
        node.inner.active_runs.fetch_add(1, Ordering::SeqCst);
        let mut run = Self {
            node,
            state: RunState::NotStarted,
        };
        run.advance(RunState::Running);
        run
    }

    fn advance(&mut self, to: RunState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "invalid transition {} -> {}",
            self.state,
            to
        );
        tracing::trace!(
            "{}",
            StateTransition {
                node: self.node.label(),
                from: self.state,
                to,
            }
        );
        self.state = to;
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.node.inner.active_runs.fetch_sub(1, Ordering::SeqCst);
    }
}
