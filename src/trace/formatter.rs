use crate::executor::RunOutcome;
use crate::validator::ValidationReport;
use crate::workflow::{NodeStatus, WorkflowNode, WorkflowState};
use itertools::Itertools;

/// Formats workflow runs into human-readable summaries
pub struct RunFormatter;

impl RunFormatter {
    /// One line per node, in execution order when the workflow has been run and in
    /// stored order otherwise.
    pub fn format_state(state: &WorkflowState) -> String {
        let graph = state.graph();
        let nodes: Vec<&WorkflowNode> = if state.execution_order().is_empty() {
            graph.nodes().iter().collect()
        } else {
            state
                .execution_order()
                .iter()
                .filter_map(|id| graph.node(id))
                .collect()
        };

        nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| format!("{:>2}. {}", i + 1, Self::format_node(node)))
            .join("\n")
    }

    /// A short verdict line for a finished run.
    pub fn format_outcome(outcome: &RunOutcome) -> String {
        match outcome {
            RunOutcome::Completed { order, .. } => {
                format!("Completed {} steps", order.len())
            }
            RunOutcome::Halted {
                order,
                failed_node,
                error,
            } => {
                let position = order.iter().position(|id| id == failed_node).map_or(0, |p| p + 1);
                format!(
                    "Halted at step {} of {} ('{}'): {}",
                    position,
                    order.len(),
                    failed_node,
                    error
                )
            }
        }
    }

    pub fn format_report(report: &ValidationReport) -> String {
        if report.valid {
            "Workflow is valid".to_string()
        } else {
            report.errors.iter().map(|e| format!("  - {}", e)).join("\n")
        }
    }

    fn format_node(node: &WorkflowNode) -> String {
        let mut line = format!(
            "[{}] {} ({})",
            Self::status_marker(node.status()),
            node.label,
            node.id
        );
        if let Some(ms) = node.execution_time_ms() {
            line.push_str(&format!(" {}ms", ms));
        }
        if let Some(error) = node.error() {
            line.push_str(&format!(" - {}", error));
        }
        line
    }

    fn status_marker(status: NodeStatus) -> &'static str {
        match status {
            NodeStatus::Idle => " ",
            NodeStatus::Running => "~",
            NodeStatus::Success => "x",
            NodeStatus::Failed => "!",
        }
    }
}
