use super::rules::{is_card_capture, is_scanner, scanners_fed_by};
use crate::error::{ConnectionRejected, GraphError};
use crate::workflow::WorkflowGraph;
use tracing::debug;

/// Decides whether `source -> target` may be added to the graph.
///
/// Runs before the edge is committed, using the same wiring predicates as the
/// pre-run Scanner rule.
pub fn check_connection(
    graph: &WorkflowGraph,
    source: &str,
    target: &str,
) -> Result<(), ConnectionRejected> {
    if source == target {
        return Err(ConnectionRejected::SelfLoop(source.to_string()));
    }
    for id in [source, target] {
        if !graph.contains_node(id) {
            return Err(GraphError::NodeNotFound(id.to_string()).into());
        }
    }

    if is_scanner(graph, target) {
        if !is_card_capture(graph, source) {
            debug!(source, target, "Rejected connection into Scanner from a non Card Capture node");
            return Err(ConnectionRejected::ScannerSourceNotCardCapture {
                source_node: source.to_string(),
                target: target.to_string(),
            });
        }
        if graph.incoming(target).next().is_some() {
            debug!(source, target, "Rejected second connection into Scanner");
            return Err(ConnectionRejected::ScannerAlreadyConnected {
                target: target.to_string(),
            });
        }
        if let Some(existing) = scanners_fed_by(graph, source).find(|id| *id != target) {
            debug!(source, target, existing, "Rejected Card Capture fan-out to a second Scanner");
            return Err(ConnectionRejected::CardCaptureAlreadyFeedsScanner {
                source_node: source.to_string(),
                existing: existing.to_string(),
                target: target.to_string(),
            });
        }
    }

    Ok(())
}
