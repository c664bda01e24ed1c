//! Common test utilities for building workflows and scripting service responses.
use kensa::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Builds a state from `(id, kind)` pairs and raw edges, bypassing the wiring rules
/// so tests can construct graphs the canvas would never allow.
#[allow(dead_code)]
pub fn raw_state(nodes: &[(&str, NodeKind)], edges: &[(&str, &str)]) -> WorkflowState {
    let mut state = WorkflowState::new("Test workflow");
    for (id, kind) in nodes {
        state
            .add_node(WorkflowNode::new(*id, kind.clone()))
            .expect("duplicate node in fixture");
    }
    for (source, target) in edges {
        state
            .graph_mut()
            .add_edge(WorkflowEdge::new(*source, *target))
            .expect("invalid edge in fixture");
    }
    state
}

/// Builds `nodes[0] -> nodes[1] -> ...` through `connect`.
#[allow(dead_code)]
pub fn chain(nodes: Vec<WorkflowNode>) -> WorkflowState {
    let mut state = WorkflowState::new("Test workflow");
    let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    for node in nodes {
        state.add_node(node).expect("duplicate node in fixture");
    }
    for pair in ids.windows(2) {
        state
            .connect(&pair[0], &pair[1])
            .expect("fixture connection rejected");
    }
    state
}

/// `Start -> A -> End`, where A calls `/api/a`.
#[allow(dead_code)]
pub fn start_a_end() -> WorkflowState {
    chain(vec![
        WorkflowNode::new("start", NodeKind::Start),
        WorkflowNode::new("a", NodeKind::Liveness).with_endpoint("/api/a"),
        WorkflowNode::new("end", NodeKind::End),
    ])
}

/// `Start -> A -> B -> End`, calling `/api/a` then `/api/b`.
#[allow(dead_code)]
pub fn start_a_b_end() -> WorkflowState {
    chain(vec![
        WorkflowNode::new("start", NodeKind::Start),
        WorkflowNode::new("a", NodeKind::Liveness).with_endpoint("/api/a"),
        WorkflowNode::new("b", NodeKind::Liveness).with_endpoint("/api/b"),
        WorkflowNode::new("end", NodeKind::End),
    ])
}

/// One recorded call to a [`ScriptedPort`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: String,
    pub payload: Map<String, Value>,
    pub node_id: String,
}

/// An execution port with per-endpoint scripted answers that records every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedPort {
    answers: HashMap<String, std::result::Result<Value, String>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[allow(dead_code)]
impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, endpoint: &str, data: Value) -> Self {
        self.answers.insert(endpoint.to_string(), Ok(data));
        self
    }

    pub fn fail(mut self, endpoint: &str, message: &str) -> Self {
        self.answers
            .insert(endpoint.to_string(), Err(message.to_string()));
        self
    }

    /// A shared handle to the call log that stays valid after the port is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl ExecutionPort for ScriptedPort {
    async fn execute(
        &self,
        endpoint: &str,
        payload: &Map<String, Value>,
        node_id: &str,
    ) -> std::result::Result<ExecutionResponse, PortError> {
        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
            node_id: node_id.to_string(),
        });

        match self.answers.get(endpoint) {
            Some(Ok(data)) => Ok(ExecutionResponse {
                success: true,
                data: data.clone(),
                timestamp: "2026-01-01T00:00:00Z".to_string(),
                processing_time_ms: 5,
                node_id: node_id.to_string(),
                endpoint: endpoint.to_string(),
            }),
            Some(Err(message)) => Err(PortError::Request {
                endpoint: endpoint.to_string(),
                message: message.clone(),
            }),
            None => Err(PortError::UnknownEndpoint(endpoint.to_string())),
        }
    }
}

#[allow(dead_code)]
pub fn status_of(state: &WorkflowState, id: &str) -> NodeStatus {
    state.node(id).expect("node missing").status()
}
