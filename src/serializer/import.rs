use super::export::ExportDocument;
use crate::error::{GraphError, ImportError};
use crate::workflow::{GraphParts, NodeKind, WorkflowGraph, WorkflowNode, WorkflowState};
use serde_json::Value;
use tracing::{debug, info};

/// A workflow read from an import document, not yet applied to any state.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedWorkflow {
    pub name: Option<String>,
    pub graph: WorkflowGraph,
}

/// Parses either document shape into a graph.
///
/// * `{ workflowName, nodes: [{ type, connections, .. }] }`: the export format.
///   Kinds come from the type labels; unknown labels are kept as the kind.
/// * `{ nodes, edges }`: the raw graph as persisted.
///
/// A document whose nodes carry `connections` is always read as the export format.
///
/// Imported nodes always start out idle.
pub fn parse_workflow(json: &str) -> Result<ImportedWorkflow, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(ImportError::Malformed(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let nodes = object.get("nodes").and_then(Value::as_array);
    let has_edges = object.get("edges").is_some_and(Value::is_array);
    // Node-level `connections` mark the labelled format even if a stray `edges` key is present.
    let has_connections = nodes.is_some_and(|nodes| {
        nodes
            .iter()
            .any(|n| n.get("connections").is_some_and(Value::is_array))
    });

    let imported = match (nodes.is_some(), has_edges && !has_connections) {
        (true, true) => {
            debug!("Importing raw graph document");
            from_raw(value)?
        }
        (true, false) => {
            debug!("Importing labelled workflow document");
            from_labelled(value)?
        }
        _ => {
            return Err(ImportError::Malformed(
                "document has neither a `nodes` list with connections nor `nodes` and `edges` lists"
                    .to_string(),
            ));
        }
    };

    Ok(imported)
}

/// Parses `json` and replaces the state's graph with it. On error the state is untouched.
pub fn import_workflow(state: &mut WorkflowState, json: &str) -> Result<(), ImportError> {
    let ImportedWorkflow { name, graph } = parse_workflow(json)?;
    info!(nodes = graph.nodes().len(), edges = graph.edges().len(), "Workflow imported");
    if let Some(name) = name {
        state.name = name;
    }
    state.replace_graph(graph);
    Ok(())
}

fn from_labelled(value: Value) -> Result<ImportedWorkflow, ImportError> {
    let document: ExportDocument =
        serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let mut graph = WorkflowGraph::new();
    for exported in &document.nodes {
        let mut node = WorkflowNode::new(exported.id.clone(), NodeKind::from_label(&exported.type_label));
        node.api_endpoint = exported.api_endpoint.clone();
        node.position = exported.position;
        node.inputs = exported.inputs.clone();
        node.outputs = exported.outputs.clone();
        graph.add_node(node).map_err(malformed)?;
    }
    for exported in &document.nodes {
        for target in &exported.connections {
            graph
                .add_connection(&exported.id, target)
                .map_err(malformed)?;
        }
    }

    Ok(ImportedWorkflow {
        name: Some(document.workflow_name).filter(|n| !n.is_empty()),
        graph,
    })
}

fn from_raw(value: Value) -> Result<ImportedWorkflow, ImportError> {
    let name = value
        .get("workflowName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let parts: GraphParts =
        serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))?;
    let mut graph = WorkflowGraph::from_parts(parts.nodes, parts.edges).map_err(malformed)?;
    graph.clear_run_state();
    Ok(ImportedWorkflow { name, graph })
}

fn malformed(e: GraphError) -> ImportError {
    ImportError::Malformed(e.to_string())
}
