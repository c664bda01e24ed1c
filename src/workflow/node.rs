use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

pub type NodeId = String;

/// The fixed role of a workflow step.
///
/// Kinds are stored as short camelCase slugs (`"cardCapture"`). Anything that is not
/// a known slug survives as [`NodeKind::Other`] so imported documents from newer
/// editors are not rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Start,
    End,
    Liveness,
    CardCapture,
    Scanner,
    Other(String),
}

impl NodeKind {
    /// The human-readable type label used in exported documents.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Liveness => "Liveness Check",
            NodeKind::CardCapture => "Card Capture",
            NodeKind::Scanner => "Scanner",
            NodeKind::Other(name) => name,
        }
    }

    /// Reverses [`NodeKind::label`]. Unknown labels pass through unchanged as the kind.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Start" => NodeKind::Start,
            "End" => NodeKind::End,
            "Liveness Check" => NodeKind::Liveness,
            "Card Capture" => NodeKind::CardCapture,
            "Scanner" => NodeKind::Scanner,
            other => NodeKind::from(other.to_string()),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Liveness => "liveness",
            NodeKind::CardCapture => "cardCapture",
            NodeKind::Scanner => "scanner",
            NodeKind::Other(name) => name,
        }
    }

    /// Start and End are bookkeeping steps that never call out to a service.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKind::Start | NodeKind::End)
    }

    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            NodeKind::Liveness => Some("/api/liveness"),
            NodeKind::CardCapture => Some("/api/card-capture"),
            NodeKind::Scanner => Some("/api/scanner"),
            _ => None,
        }
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "start" => NodeKind::Start,
            "end" => NodeKind::End,
            "liveness" => NodeKind::Liveness,
            "cardCapture" => NodeKind::CardCapture,
            "scanner" => NodeKind::Scanner,
            _ => NodeKind::Other(value),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.slug().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-node execution status: `Idle -> Running -> {Success | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single step of a verification workflow.
///
/// The run-derived fields (`status`, `error`, `last_response`, `execution_time_ms`,
/// `updated_at`) are read-only outside the crate; only the executor writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: NodeId,
    #[serde(alias = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub outputs: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub(crate) status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) last_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) execution_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl WorkflowNode {
    /// Creates an idle node with the kind's display label and default endpoint.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        let label = kind.label().to_string();
        let api_endpoint = kind.default_endpoint().map(str::to_string);
        Self {
            id: id.into(),
            kind,
            label,
            api_endpoint,
            inputs: Map::new(),
            outputs: Map::new(),
            position: Position::default(),
            status: NodeStatus::Idle,
            error: None,
            last_response: None,
            execution_time_ms: None,
            updated_at: None,
        }
    }

    /// Creates a node with an id of the form `<kind>-<uuid>`, as a canvas drop does.
    pub fn new_with_generated_id(kind: NodeKind) -> Self {
        let id = format!("{}-{}", kind.slug(), Uuid::new_v4());
        Self::new(id, kind)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn without_endpoint(mut self) -> Self {
        self.api_endpoint = None;
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: Value) -> Self {
        self.inputs.insert(key.into(), value);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_response(&self) -> Option<&Value> {
        self.last_response.as_ref()
    }

    pub fn execution_time_ms(&self) -> Option<u64> {
        self.execution_time_ms
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    // --- Run-state transitions, driven by the executor ---

    pub(crate) fn mark_running(&mut self, now: DateTime<Utc>) {
        self.status = NodeStatus::Running;
        self.error = None;
        self.last_response = None;
        self.execution_time_ms = None;
        self.updated_at = Some(now);
    }

    pub(crate) fn mark_success(
        &mut self,
        now: DateTime<Utc>,
        response: Option<Value>,
        execution_time_ms: Option<u64>,
    ) {
        self.status = NodeStatus::Success;
        self.error = None;
        self.last_response = response;
        self.execution_time_ms = execution_time_ms;
        self.updated_at = Some(now);
    }

    pub(crate) fn mark_failed(&mut self, now: DateTime<Utc>, message: String) {
        self.status = NodeStatus::Failed;
        self.error = Some(message);
        self.updated_at = Some(now);
    }

    pub(crate) fn clear_run_state(&mut self) {
        self.status = NodeStatus::Idle;
        self.error = None;
        self.last_response = None;
        self.execution_time_ms = None;
        self.updated_at = None;
    }
}

/// A partial update to a node's editable data.
///
/// Patches coming from the canvas may carry `id` or `kind` keys; those are ignored
/// during deserialization, so an update can never change a node's identity or role.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, with = "double_option")]
    pub api_endpoint: Option<Option<String>>,
    #[serde(default)]
    pub inputs: Option<Map<String, Value>>,
    #[serde(default)]
    pub outputs: Option<Map<String, Value>>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl NodePatch {
    pub(crate) fn apply(self, node: &mut WorkflowNode) {
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(endpoint) = self.api_endpoint {
            node.api_endpoint = endpoint;
        }
        if let Some(inputs) = self.inputs {
            node.inputs = inputs;
        }
        if let Some(outputs) = self.outputs {
            node.outputs = outputs;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
    }
}

/// Distinguishes an absent `apiEndpoint` key (leave as is) from an explicit `null` (clear it).
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}
