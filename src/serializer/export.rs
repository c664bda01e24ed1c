use crate::workflow::{NodeId, Position, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The shareable, human-readable form of a workflow.
///
/// Edges are not stored separately: each node lists the ids it connects to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub workflow_name: String,
    pub nodes: Vec<ExportedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNode {
    pub id: NodeId,
    /// Human-readable kind label, e.g. `"Card Capture"`.
    #[serde(rename = "type")]
    pub type_label: String,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub outputs: Map<String, Value>,
    #[serde(default)]
    pub connections: Vec<NodeId>,
}

/// Builds the export document for the current workflow.
pub fn export_workflow(state: &WorkflowState) -> ExportDocument {
    let graph = state.graph();
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| ExportedNode {
            id: node.id.clone(),
            type_label: node.kind.label().to_string(),
            api_endpoint: node.api_endpoint.clone(),
            position: node.position,
            inputs: node.inputs.clone(),
            outputs: node.outputs.clone(),
            connections: graph.outgoing(&node.id).map(|e| e.target.clone()).collect(),
        })
        .collect();

    ExportDocument {
        workflow_name: state.name.clone(),
        nodes,
    }
}

/// Serializes the export document as pretty-printed JSON.
pub fn export_json(state: &WorkflowState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_workflow(state))
}
