use crate::error::{PortError, RunError};
use crate::scheduler::Schedule;
use crate::validator::{Validator, scanner_fault};
use crate::workflow::{NodeId, NodeKind, WorkflowState};
use chrono::Utc;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod port;
mod simulated;

pub use port::{ExecutionPort, ExecutionResponse};
pub use simulated::{SimulatedBackend, SimulatedBackendBuilder};

pub const DEFAULT_COMPLETION_MESSAGE: &str = "Workflow completed successfully";

/// How a run that was allowed to start ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every node in the order succeeded.
    Completed {
        order: Vec<NodeId>,
        previous_result: Option<Value>,
    },
    /// A service step failed; nodes after it were never started.
    Halted {
        order: Vec<NodeId>,
        failed_node: NodeId,
        error: String,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn order(&self) -> &[NodeId] {
        match self {
            RunOutcome::Completed { order, .. } | RunOutcome::Halted { order, .. } => order,
        }
    }
}

enum Step {
    Continue,
    Halt(String),
}

/// Drives a workflow run: validate, order, then execute nodes one at a time.
///
/// An `Executor` can be reused for any number of runs and workflows.
pub struct Executor {
    port: Box<dyn ExecutionPort>,
    validator: Validator,
    completion_message: String,
    forward_previous_result: bool,
}

pub struct ExecutorBuilder {
    port: Box<dyn ExecutionPort>,
    validator: Validator,
    completion_message: String,
    forward_previous_result: bool,
}

impl ExecutorBuilder {
    pub fn new(port: impl ExecutionPort + 'static) -> Self {
        Self {
            port: Box::new(port),
            validator: Validator::default(),
            completion_message: DEFAULT_COMPLETION_MESSAGE.to_string(),
            forward_previous_result: true,
        }
    }

    /// Replaces the pre-flight rule set.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// The message recorded on the End node when a run completes.
    pub fn completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = message.into();
        self
    }

    /// Whether each service call receives the previous step's data as `previousResult`.
    pub fn forward_previous_result(mut self, forward: bool) -> Self {
        self.forward_previous_result = forward;
        self
    }

    pub fn build(self) -> Executor {
        Executor {
            port: self.port,
            validator: self.validator,
            completion_message: self.completion_message,
            forward_previous_result: self.forward_previous_result,
        }
    }
}

impl Executor {
    pub fn new(port: impl ExecutionPort + 'static) -> Self {
        ExecutorBuilder::new(port).build()
    }

    pub fn builder(port: impl ExecutionPort + 'static) -> ExecutorBuilder {
        ExecutorBuilder::new(port)
    }

    /// Runs the workflow to completion or to its first failing step.
    ///
    /// # Returns
    ///
    /// * `Err(RunError)`: the run was refused; no node state was touched.
    /// * `Ok(RunOutcome::Completed)`: every node succeeded.
    /// * `Ok(RunOutcome::Halted)`: a step failed. The failure is recorded on that
    ///   node and every earlier result stays in place.
    pub async fn run(&self, state: &mut WorkflowState) -> Result<RunOutcome, RunError> {
        let report = self.validator.validate(state.graph());
        if !report.valid {
            warn!(workflow = %state.name, errors = ?report.errors, "Workflow failed validation");
            return Err(RunError::Validation(report.errors));
        }

        // The graph may have been edited directly since the last connection check.
        let graph = state.graph();
        if let Some(scanner) = graph
            .nodes_of_kind(&NodeKind::Scanner)
            .find(|s| scanner_fault(graph, s).is_some())
        {
            return Err(RunError::ScannerWiring {
                node_id: scanner.id.clone(),
            });
        }

        let schedule = Schedule::for_graph(state.graph());
        if !schedule.is_complete() {
            warn!(
                scheduled = schedule.order.len(),
                total = schedule.total,
                "Execution order is incomplete"
            );
            return Err(RunError::IncompleteOrder {
                scheduled: schedule.order.len(),
                total: schedule.total,
            });
        }

        state.is_executing = true;
        state.execution_order = schedule.order.clone();
        info!(workflow = %state.name, steps = schedule.order.len(), "Workflow run started");
        debug!(order = ?schedule.order, "Execution order");

        let run_start = Instant::now();
        let mut previous_result: Option<Value> = None;
        let mut halted: Option<(NodeId, String)> = None;

        for node_id in &schedule.order {
            if let Step::Halt(error) = self.step(state, node_id, &mut previous_result).await {
                halted = Some((node_id.clone(), error));
                break;
            }
        }

        state.is_executing = false;
        let elapsed_ms = run_start.elapsed().as_millis() as u64;

        Ok(match halted {
            Some((failed_node, error)) => {
                warn!(node_id = %failed_node, %error, elapsed_ms, "Workflow run halted");
                RunOutcome::Halted {
                    order: schedule.order,
                    failed_node,
                    error,
                }
            }
            None => {
                info!(workflow = %state.name, elapsed_ms, "Workflow run completed");
                RunOutcome::Completed {
                    order: schedule.order,
                    previous_result,
                }
            }
        })
    }

    async fn step(
        &self,
        state: &mut WorkflowState,
        node_id: &str,
        previous_result: &mut Option<Value>,
    ) -> Step {
        let Some(node) = state.graph_mut().node_mut(node_id) else {
            warn!(node_id, "Scheduled node disappeared from the graph");
            return Step::Continue;
        };

        match node.kind {
            NodeKind::Start => {
                node.mark_success(Utc::now(), None, None);
                debug!(node_id, "Start node passed");
                return Step::Continue;
            }
            NodeKind::End => {
                let now = Utc::now();
                let completion = json!({
                    "message": self.completion_message,
                    "previousResult": previous_result.clone().unwrap_or(Value::Null),
                    "completedAt": now.to_rfc3339(),
                });
                node.mark_success(now, Some(completion), None);
                debug!(node_id, "End node reached");
                return Step::Continue;
            }
            _ => {}
        }

        node.mark_running(Utc::now());
        info!(node_id, label = %node.label, "Executing step");

        let Some(endpoint) = node.api_endpoint.clone().filter(|e| !e.trim().is_empty()) else {
            let message = PortError::MissingEndpoint(node_id.to_string()).to_string();
            node.mark_failed(Utc::now(), message.clone());
            return Step::Halt(message);
        };

        let mut payload = node.inputs.clone();
        if self.forward_previous_result {
            if let Some(previous) = previous_result.as_ref() {
                payload
                    .entry("previousResult")
                    .or_insert_with(|| previous.clone());
            }
        }

        let started = Instant::now();
        let result = self.port.execute(&endpoint, &payload, node_id).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.success => {
                *previous_result = Some(response.data.clone());
                node.mark_success(Utc::now(), serde_json::to_value(&response).ok(), Some(elapsed_ms));
                info!(node_id, elapsed_ms, "Step succeeded");
                Step::Continue
            }
            Ok(response) => {
                let message = response
                    .data
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Service at '{}' reported a failure", endpoint));
                node.mark_failed(Utc::now(), message.clone());
                node.last_response = serde_json::to_value(&response).ok();
                warn!(node_id, %message, "Step reported failure");
                Step::Halt(message)
            }
            Err(e) => {
                let message = e.to_string();
                node.mark_failed(Utc::now(), message.clone());
                warn!(node_id, %message, "Step failed");
                Step::Halt(message)
            }
        }
    }
}

/// Returns every node to `Idle`, clearing error, response, timing and timestamp.
///
/// Identity, kind, endpoint, inputs and outputs are preserved.
pub fn reset(state: &mut WorkflowState) {
    state.graph_mut().clear_run_state();
    state.is_executing = false;
    state.execution_order.clear();
    debug!(workflow = %state.name, "Workflow run state reset");
}
