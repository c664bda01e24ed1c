use super::edge::WorkflowEdge;
use super::graph::WorkflowGraph;
use super::node::{NodeId, NodePatch, WorkflowNode};
use crate::error::{ConnectionRejected, GraphError};
use crate::validator::check_connection;
use tracing::debug;

pub const DEFAULT_WORKFLOW_NAME: &str = "Identity Verification Workflow";

/// The single shared workflow state observed by the canvas and driven by the executor.
///
/// Editors mutate the graph through the methods here; the executor is the only
/// writer of run-derived node fields and of the execution flags.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub name: String,
    graph: WorkflowGraph,
    pub(crate) is_executing: bool,
    pub(crate) execution_order: Vec<NodeId>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_NAME)
    }
}

impl WorkflowState {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_graph(name, WorkflowGraph::new())
    }

    pub fn with_graph(name: impl Into<String>, graph: WorkflowGraph) -> Self {
        Self {
            name: name.into(),
            graph,
            is_executing: false,
            execution_order: Vec::new(),
        }
    }

    /// A state pre-populated with the default verification flow.
    pub fn from_template() -> Self {
        Self::with_graph(DEFAULT_WORKFLOW_NAME, WorkflowGraph::template())
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Direct mutable access for bulk edits. Wiring rules are re-checked before every run.
    pub fn graph_mut(&mut self) -> &mut WorkflowGraph {
        &mut self.graph
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    /// The order computed by the most recent run.
    pub fn execution_order(&self) -> &[NodeId] {
        &self.execution_order
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.graph.node(id)
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> Result<(), GraphError> {
        self.graph.add_node(node)
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<(), GraphError> {
        self.graph.update_node(id, patch)
    }

    pub fn remove_node(&mut self, id: &str) -> Result<WorkflowNode, GraphError> {
        self.graph.remove_node(id)
    }

    /// Connects `source -> target` after checking the wiring rules.
    ///
    /// A rejected connection leaves the graph unchanged.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<WorkflowEdge, ConnectionRejected> {
        check_connection(&self.graph, source, target)?;
        let edge = self.graph.add_connection(source, target)?;
        debug!(source, target, "Connection added");
        Ok(edge)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<WorkflowEdge, GraphError> {
        self.graph.remove_edge(edge_id)
    }

    /// Replaces the whole graph, as a load or import does. Run bookkeeping is dropped.
    pub fn replace_graph(&mut self, graph: WorkflowGraph) {
        self.graph = graph;
        self.is_executing = false;
        self.execution_order.clear();
    }
}
