use crate::workflow::NodeId;
use thiserror::Error;

/// Errors raised by structural mutations of the workflow graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("A node with id '{0}' already exists")]
    DuplicateNode(NodeId),

    #[error("An edge with id '{0}' already exists")]
    DuplicateEdge(String),

    #[error("Node '{0}' is already connected to node '{1}'")]
    DuplicateConnection(NodeId, NodeId),

    #[error("Node '{0}' not found in the workflow")]
    NodeNotFound(NodeId),

    #[error("Edge '{0}' not found in the workflow")]
    EdgeNotFound(String),

    #[error("Edge '{edge_id}' references node '{node_id}', which is not part of the workflow")]
    DanglingEdge { edge_id: String, node_id: NodeId },
}

/// A proposed connection that breaks the wiring rules. The graph is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionRejected {
    #[error("Scanner node '{target}' can only be connected from a Card Capture node")]
    ScannerSourceNotCardCapture { source_node: NodeId, target: NodeId },

    #[error("Scanner node '{target}' already has an incoming connection")]
    ScannerAlreadyConnected { target: NodeId },

    #[error(
        "Card Capture node '{source_node}' already feeds Scanner node '{existing}' and cannot feed '{target}'"
    )]
    CardCaptureAlreadyFeedsScanner {
        source_node: NodeId,
        existing: NodeId,
        target: NodeId,
    },

    #[error("Node '{0}' cannot be connected to itself")]
    SelfLoop(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Reasons a run is refused before any node state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Workflow validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Scanner node '{node_id}' is not wired directly from a Card Capture node")]
    ScannerWiring { node_id: NodeId },

    #[error(
        "Only {scheduled} of {total} nodes could be ordered; the workflow contains a cycle or an unresolved dependency"
    )]
    IncompleteOrder { scheduled: usize, total: usize },
}

/// Failures reported by an execution port for a single step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortError {
    #[error("Unknown API endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Node '{0}' has no API endpoint configured")]
    MissingEndpoint(NodeId),

    #[error("Request to '{endpoint}' failed: {message}")]
    Request { endpoint: String, message: String },
}

/// Errors raised while importing a workflow document.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to parse workflow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid workflow document: {0}")]
    Malformed(String),
}

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored workflow is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Slot key '{0}' may only contain ASCII letters, digits, '_' and '-'")]
    InvalidKey(String),

    #[error("Stored workflow in slot '{0}' has no nodes or edges")]
    MissingGraph(String),

    #[error("Stored workflow in slot '{slot}' is inconsistent: {source}")]
    Inconsistent {
        slot: String,
        #[source]
        source: GraphError,
    },
}
