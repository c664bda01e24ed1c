use super::edge::WorkflowEdge;
use super::node::{NodeKind, NodePatch, WorkflowNode};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The nodes and edges of a workflow, exactly as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphParts {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// A directed graph of verification steps.
///
/// Node order is significant: it is the order the scheduler seeds its queue with.
/// Every mutation keeps node and edge ids unique and every edge attached to
/// existing nodes; deserialization goes through the same checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphParts")]
pub struct WorkflowGraph {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
}

impl TryFrom<GraphParts> for WorkflowGraph {
    type Error = GraphError;

    fn try_from(parts: GraphParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.nodes, parts.edges)
    }
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from raw parts, enforcing the same invariants as incremental edits.
    pub fn from_parts(
        nodes: Vec<WorkflowNode>,
        edges: Vec<WorkflowEdge>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// The default verification flow: `Start -> Liveness -> Card Capture -> Scanner -> End`.
    pub fn template() -> Self {
        let steps = [
            ("start", NodeKind::Start),
            ("liveness", NodeKind::Liveness),
            ("card-capture", NodeKind::CardCapture),
            ("scanner", NodeKind::Scanner),
            ("end", NodeKind::End),
        ];

        let nodes: Vec<WorkflowNode> = steps
            .iter()
            .enumerate()
            .map(|(i, (id, kind))| WorkflowNode::new(*id, kind.clone()).at(250.0 * i as f64, 100.0))
            .collect();
        let edges = nodes
            .windows(2)
            .map(|pair| WorkflowEdge::new(pair[0].id.clone(), pair[1].id.clone()))
            .collect();

        Self { nodes, edges }
    }

    pub fn into_parts(self) -> GraphParts {
        GraphParts {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn nodes_of_kind<'a>(
        &'a self,
        kind: &'a NodeKind,
    ) -> impl Iterator<Item = &'a WorkflowNode> + 'a {
        self.nodes.iter().filter(move |n| &n.kind == kind)
    }

    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Applies a patch to a node's editable data. `id` and `kind` are never touched.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        patch.apply(node);
        Ok(())
    }

    /// Removes a node along with every edge attached to it.
    pub fn remove_node(&mut self, id: &str) -> Result<WorkflowNode, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        self.edges.retain(|e| !e.touches(id));
        Ok(self.nodes.remove(index))
    }

    /// Adds an edge between two existing nodes.
    ///
    /// This only enforces model integrity. Wiring rules are applied by
    /// [`WorkflowState::connect`](super::WorkflowState::connect).
    pub fn add_edge(&mut self, edge: WorkflowEdge) -> Result<(), GraphError> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        if self.edges.iter().any(|e| e.id == edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        if self.edges.iter().any(|e| e.connects(&edge.source, &edge.target)) {
            return Err(GraphError::DuplicateConnection(edge.source, edge.target));
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Adds `source -> target` under the readable `e-<source>-<target>` id, or under
    /// `e-<uuid>` when hyphenated node ids make the readable one collide.
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<WorkflowEdge, GraphError> {
        let mut edge = WorkflowEdge::new(source, target);
        if self.edges.iter().any(|e| e.id == edge.id) {
            edge = edge.with_id(format!("e-{}", Uuid::new_v4()));
        }
        self.add_edge(edge.clone())?;
        Ok(edge)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<WorkflowEdge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))?;
        Ok(self.edges.remove(index))
    }

    pub(crate) fn clear_run_state(&mut self) {
        self.nodes.iter_mut().for_each(WorkflowNode::clear_run_state);
    }
}
