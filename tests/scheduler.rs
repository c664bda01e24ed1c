//! Tests for execution ordering over whole workflow graphs.
mod common;
use common::*;
use kensa::prelude::*;
use kensa::scheduler::has_cycle;
use std::collections::HashSet;

fn assert_topological(state: &WorkflowState, order: &[NodeId]) {
    let graph = state.graph();
    assert_eq!(order.len(), graph.nodes().len());

    let unique: HashSet<_> = order.iter().collect();
    assert_eq!(unique.len(), order.len(), "order repeats a node: {:?}", order);
    for node in graph.nodes() {
        assert!(unique.contains(&node.id), "node '{}' missing from order", node.id);
    }

    let position = |id: &str| order.iter().position(|o| o == id).unwrap();
    for edge in graph.edges() {
        assert!(
            position(&edge.source) < position(&edge.target),
            "edge {} -> {} violated by {:?}",
            edge.source,
            edge.target,
            order
        );
    }
}

#[test]
fn test_orders_are_topological_permutations() {
    let dags = [
        WorkflowState::from_template(),
        start_a_b_end(),
        // A tree: Start fans out to two branches that meet again at End.
        raw_state(
            &[
                ("end", NodeKind::End),
                ("cap", NodeKind::CardCapture),
                ("scan", NodeKind::Scanner),
                ("live", NodeKind::Liveness),
                ("start", NodeKind::Start),
            ],
            &[
                ("start", "live"),
                ("start", "cap"),
                ("cap", "scan"),
                ("scan", "end"),
                ("live", "end"),
            ],
        ),
        // Nodes stored in reverse dependency order.
        raw_state(
            &[
                ("d", NodeKind::Liveness),
                ("c", NodeKind::Liveness),
                ("b", NodeKind::Liveness),
                ("a", NodeKind::Liveness),
            ],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")],
        ),
    ];

    for state in &dags {
        let order = execution_order(state.graph().nodes(), state.graph().edges());
        assert_topological(state, &order);
        assert!(!has_cycle(state.graph()));
    }
}

#[test]
fn test_template_order() {
    let state = WorkflowState::from_template();
    let schedule = Schedule::for_graph(state.graph());
    assert!(schedule.is_complete());
    assert_eq!(
        schedule.order,
        vec!["start", "liveness", "card-capture", "scanner", "end"]
    );
}

#[test]
fn test_branch_order_follows_discovery() {
    let state = raw_state(
        &[
            ("start", NodeKind::Start),
            ("live", NodeKind::Liveness),
            ("cap", NodeKind::CardCapture),
            ("end", NodeKind::End),
        ],
        &[("start", "cap"), ("start", "live"), ("cap", "end"), ("live", "end")],
    );
    let order = execution_order(state.graph().nodes(), state.graph().edges());
    assert_eq!(order, vec!["start", "cap", "live", "end"]);
}

#[test]
fn test_cycle_leaves_nodes_unscheduled() {
    let state = raw_state(
        &[
            ("start", NodeKind::Start),
            ("a", NodeKind::Liveness),
            ("b", NodeKind::Liveness),
            ("end", NodeKind::End),
        ],
        &[("start", "a"), ("a", "b"), ("b", "a"), ("b", "end")],
    );
    let schedule = Schedule::for_graph(state.graph());
    assert!(schedule.order.len() < state.graph().nodes().len());
    assert_eq!(schedule.order, vec!["start"]);
    assert!(!schedule.is_complete());
    assert!(has_cycle(state.graph()));
}
