//! Deterministic execution ordering via Kahn's algorithm.

use crate::workflow::{NodeId, WorkflowEdge, WorkflowGraph, WorkflowNode};
use ahash::AHashMap;
use std::collections::VecDeque;

/// Computes a topological order of `nodes` following `edges`.
///
/// The queue is FIFO and seeded in stored node order, so among nodes that become
/// ready together the one discovered first runs first. Successors are visited in
/// edge order. Edges naming unknown nodes are ignored.
///
/// Nodes on a cycle never reach in-degree zero, so a result shorter than
/// `nodes.len()` means the graph could not be fully ordered.
pub fn execution_order(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<NodeId> {
    let mut in_degree: AHashMap<&str, usize> =
        nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
    let mut successors: AHashMap<&str, Vec<&str>> = AHashMap::new();

    for edge in edges {
        if !in_degree.contains_key(edge.source.as_str()) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
            *degree += 1;
            successors
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        let Some(next) = successors.get(id) else {
            continue;
        };
        for &target in next {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    order
}

/// An execution order together with the size of the graph it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub order: Vec<NodeId>,
    pub total: usize,
}

impl Schedule {
    pub fn for_graph(graph: &WorkflowGraph) -> Self {
        Self {
            order: execution_order(graph.nodes(), graph.edges()),
            total: graph.nodes().len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.order.len() == self.total
    }
}

/// True when some nodes can never be scheduled.
pub fn has_cycle(graph: &WorkflowGraph) -> bool {
    !Schedule::for_graph(graph).is_complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::NodeKind;

    fn nodes(ids: &[&str]) -> Vec<WorkflowNode> {
        ids.iter()
            .map(|id| WorkflowNode::new(*id, NodeKind::Liveness))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<WorkflowEdge> {
        pairs.iter().map(|(s, t)| WorkflowEdge::new(*s, *t)).collect()
    }

    #[test]
    fn test_linear_chain() {
        let order = execution_order(
            &nodes(&["c", "b", "a"]),
            &edges(&[("a", "b"), ("b", "c")]),
        );
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fifo_tie_break_follows_stored_order() {
        // Two roots, both feeding "join".
        let order = execution_order(
            &nodes(&["r2", "join", "r1"]),
            &edges(&[("r1", "join"), ("r2", "join")]),
        );
        assert_eq!(order, vec!["r2", "r1", "join"]);
    }

    #[test]
    fn test_successors_enqueued_in_discovery_order() {
        let order = execution_order(
            &nodes(&["root", "x", "y", "z"]),
            &edges(&[("root", "z"), ("root", "x"), ("root", "y")]),
        );
        assert_eq!(order, vec!["root", "z", "x", "y"]);
    }

    #[test]
    fn test_cycle_produces_short_order() {
        let order = execution_order(
            &nodes(&["start", "a", "b"]),
            &edges(&[("start", "a"), ("a", "b"), ("b", "a")]),
        );
        assert_eq!(order, vec!["start"]);
    }

    #[test]
    fn test_unknown_edge_endpoints_are_ignored() {
        let order = execution_order(&nodes(&["a", "b"]), &edges(&[("ghost", "b"), ("a", "ghost")]));
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_graph() {
        assert!(execution_order(&[], &[]).is_empty());
    }
}
