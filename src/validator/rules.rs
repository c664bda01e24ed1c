use crate::workflow::{NodeKind, WorkflowGraph, WorkflowNode};

/// Defines the contract for a single structural check over a workflow graph.
///
/// Rules never stop at the first problem: each one appends every message that
/// applies, so the caller sees the complete list in one pass.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, graph: &WorkflowGraph, errors: &mut Vec<String>);
}

/// Requires exactly one node of the given kind.
pub struct SingletonRule {
    kind: NodeKind,
}

impl SingletonRule {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl ValidationRule for SingletonRule {
    fn name(&self) -> &str {
        "singleton"
    }

    fn check(&self, graph: &WorkflowGraph, errors: &mut Vec<String>) {
        let label = self.kind.label();
        let article = match label.chars().next() {
            Some('A' | 'E' | 'I' | 'O' | 'U') => "an",
            _ => "a",
        };
        match graph.nodes_of_kind(&self.kind).count() {
            0 => errors.push(format!("Workflow must have {} {} node", article, label)),
            1 => {}
            _ => errors.push(format!("Workflow can only have one {} node", label)),
        }
    }
}

/// Why a Scanner node's wiring is unacceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerFault {
    IncomingCount(usize),
    SourceNotCardCapture,
}

/// Inspects the single-input wiring of one Scanner node.
pub fn scanner_fault(graph: &WorkflowGraph, scanner: &WorkflowNode) -> Option<ScannerFault> {
    let incoming: Vec<_> = graph.incoming(&scanner.id).collect();
    if incoming.len() != 1 {
        return Some(ScannerFault::IncomingCount(incoming.len()));
    }
    if !is_card_capture(graph, &incoming[0].source) {
        return Some(ScannerFault::SourceNotCardCapture);
    }
    None
}

pub(crate) fn is_card_capture(graph: &WorkflowGraph, node_id: &str) -> bool {
    graph
        .node(node_id)
        .is_some_and(|n| n.kind == NodeKind::CardCapture)
}

pub(crate) fn is_scanner(graph: &WorkflowGraph, node_id: &str) -> bool {
    graph
        .node(node_id)
        .is_some_and(|n| n.kind == NodeKind::Scanner)
}

/// The Scanner nodes a Card Capture node currently feeds.
pub(crate) fn scanners_fed_by<'a>(
    graph: &'a WorkflowGraph,
    card_capture_id: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    graph
        .outgoing(card_capture_id)
        .filter(move |e| is_scanner(graph, &e.target))
        .map(|e| e.target.as_str())
}

/// Scanner nodes need exactly one input, coming straight from a Card Capture
/// node, and a Card Capture node feeds at most one Scanner.
pub struct ScannerWiringRule;

impl ValidationRule for ScannerWiringRule {
    fn name(&self) -> &str {
        "scanner-wiring"
    }

    fn check(&self, graph: &WorkflowGraph, errors: &mut Vec<String>) {
        for scanner in graph.nodes_of_kind(&NodeKind::Scanner) {
            match scanner_fault(graph, scanner) {
                Some(ScannerFault::IncomingCount(_)) => errors.push(format!(
                    "Scanner node '{}' must have exactly one incoming connection",
                    scanner.label
                )),
                Some(ScannerFault::SourceNotCardCapture) => errors.push(format!(
                    "Scanner node '{}' must connect directly from Card Capture node",
                    scanner.label
                )),
                None => {}
            }
        }

        for card in graph.nodes_of_kind(&NodeKind::CardCapture) {
            if scanners_fed_by(graph, &card.id).count() > 1 {
                errors.push(format!(
                    "Card Capture node '{}' can only feed one Scanner node",
                    card.label
                ));
            }
        }
    }
}

/// Opt-in rule: every service step must name the endpoint it calls.
pub struct EndpointRequiredRule;

impl ValidationRule for EndpointRequiredRule {
    fn name(&self) -> &str {
        "endpoint-required"
    }

    fn check(&self, graph: &WorkflowGraph, errors: &mut Vec<String>) {
        for node in graph.nodes().iter().filter(|n| !n.kind.is_terminal()) {
            let missing = node
                .api_endpoint
                .as_deref()
                .is_none_or(|e| e.trim().is_empty());
            if missing {
                errors.push(format!("Node '{}' requires an API endpoint", node.label));
            }
        }
    }
}

pub(super) fn register_default_rules(rules: &mut Vec<Box<dyn ValidationRule>>) {
    rules.push(Box::new(SingletonRule::new(NodeKind::Start)));
    rules.push(Box::new(SingletonRule::new(NodeKind::End)));
    rules.push(Box::new(ScannerWiringRule));
}
