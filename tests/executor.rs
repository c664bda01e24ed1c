//! Tests for the run loop: status transitions, data hand-off and halting.
mod common;
use common::*;
use kensa::prelude::*;
use kensa::validator::{SingletonRule, ValidatorBuilder};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_test::block_on;

#[test]
fn test_start_a_end_succeeds_and_threads_result() {
    let mut state = start_a_end();
    let port = ScriptedPort::new().respond("/api/a", json!({ "score": 0.93 }));
    let executor = Executor::new(port);

    let outcome = block_on(executor.run(&mut state)).unwrap();

    assert_eq!(status_of(&state, "start"), NodeStatus::Success);
    assert_eq!(status_of(&state, "a"), NodeStatus::Success);
    assert_eq!(status_of(&state, "end"), NodeStatus::Success);

    let end = state.node("end").unwrap();
    let completion = end.last_response().expect("End records a completion payload");
    assert_eq!(completion["previousResult"], json!({ "score": 0.93 }));
    assert_eq!(completion["message"], json!("Workflow completed successfully"));

    let a = state.node("a").unwrap();
    assert_eq!(a.last_response().unwrap()["data"], json!({ "score": 0.93 }));
    assert!(a.execution_time_ms().is_some());
    assert!(a.updated_at().is_some());

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            order: vec!["start".to_string(), "a".to_string(), "end".to_string()],
            previous_result: Some(json!({ "score": 0.93 })),
        }
    );
    assert!(!state.is_executing());
    assert_eq!(state.execution_order(), ["start", "a", "end"]);
}

#[test]
fn test_failure_halts_before_end() {
    let mut state = start_a_b_end();
    let port = ScriptedPort::new()
        .respond("/api/a", json!({ "ok": true }))
        .fail("/api/b", "document unreadable");
    let calls = port.calls();
    let executor = Executor::new(port);

    let outcome = block_on(executor.run(&mut state)).unwrap();

    assert_eq!(status_of(&state, "start"), NodeStatus::Success);
    assert_eq!(status_of(&state, "a"), NodeStatus::Success);
    assert_eq!(status_of(&state, "b"), NodeStatus::Failed);
    assert_eq!(status_of(&state, "end"), NodeStatus::Idle);

    let b = state.node("b").unwrap();
    assert!(b.error().unwrap().contains("document unreadable"));
    // Earlier results stay visible after the halt.
    assert_eq!(state.node("a").unwrap().last_response().unwrap()["data"], json!({ "ok": true }));

    match outcome {
        RunOutcome::Halted { failed_node, error, .. } => {
            assert_eq!(failed_node, "b");
            assert!(error.contains("document unreadable"));
        }
        other => panic!("expected a halted run, got {:?}", other),
    }

    let endpoints: Vec<_> = calls.lock().unwrap().iter().map(|c| c.endpoint.clone()).collect();
    assert_eq!(endpoints, vec!["/api/a", "/api/b"]);
    assert!(!state.is_executing());
}

#[test]
fn test_unknown_endpoint_fails_the_step() {
    let mut state = start_a_end();
    let executor = Executor::new(ScriptedPort::new());

    let outcome = block_on(executor.run(&mut state)).unwrap();
    assert!(!outcome.is_completed());
    assert_eq!(status_of(&state, "a"), NodeStatus::Failed);
    assert_eq!(
        state.node("a").unwrap().error(),
        Some("Unknown API endpoint: /api/a")
    );
}

#[test]
fn test_previous_result_forwarded_to_next_step() {
    let mut state = chain(vec![
        WorkflowNode::new("start", NodeKind::Start),
        WorkflowNode::new("a", NodeKind::Liveness)
            .with_endpoint("/api/a")
            .with_input("mode", json!("passive")),
        WorkflowNode::new("b", NodeKind::CardCapture).with_endpoint("/api/b"),
        WorkflowNode::new("end", NodeKind::End),
    ]);
    let port = ScriptedPort::new()
        .respond("/api/a", json!({ "isLive": true }))
        .respond("/api/b", json!({ "captureId": "c-1" }));
    let calls = port.calls();

    block_on(Executor::new(port).run(&mut state)).unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].node_id, "a");
    assert_eq!(calls[0].payload.get("mode"), Some(&json!("passive")));
    assert!(calls[0].payload.get("previousResult").is_none());
    assert_eq!(calls[1].payload.get("previousResult"), Some(&json!({ "isLive": true })));
}

#[test]
fn test_forwarding_can_be_disabled() {
    let mut state = start_a_b_end();
    let port = ScriptedPort::new()
        .respond("/api/a", json!(1))
        .respond("/api/b", json!(2));
    let calls = port.calls();
    let executor = Executor::builder(port)
        .forward_previous_result(false)
        .completion_message("done")
        .build();

    block_on(executor.run(&mut state)).unwrap();

    assert!(calls.lock().unwrap().iter().all(|c| c.payload.is_empty()));
    let completion = state.node("end").unwrap().last_response().unwrap();
    assert_eq!(completion["message"], json!("done"));
    assert_eq!(completion["previousResult"], json!(2));
}

#[test]
fn test_invalid_workflow_is_refused_without_mutation() {
    let mut state = raw_state(
        &[("a", NodeKind::Liveness), ("end", NodeKind::End)],
        &[("a", "end")],
    );
    let port = ScriptedPort::new().respond("/api/liveness", json!({}));
    let calls = port.calls();

    let err = block_on(Executor::new(port).run(&mut state)).unwrap_err();
    assert_eq!(
        err,
        RunError::Validation(vec!["Workflow must have a Start node".to_string()])
    );
    assert!(calls.lock().unwrap().is_empty());
    assert!(state.graph().nodes().iter().all(|n| n.status() == NodeStatus::Idle));
    assert!(state.execution_order().is_empty());
}

#[test]
fn test_cyclic_workflow_is_refused() {
    let mut state = raw_state(
        &[
            ("start", NodeKind::Start),
            ("a", NodeKind::Liveness),
            ("b", NodeKind::Liveness),
            ("end", NodeKind::End),
        ],
        &[("start", "a"), ("a", "b"), ("b", "a"), ("b", "end")],
    );
    let executor = Executor::new(ScriptedPort::new());

    let err = block_on(executor.run(&mut state)).unwrap_err();
    assert_eq!(err, RunError::IncompleteOrder { scheduled: 1, total: 4 });
    assert_eq!(status_of(&state, "start"), NodeStatus::Idle);
    assert!(!state.is_executing());
}

#[test]
fn test_scanner_wiring_rechecked_with_custom_validator() {
    // A rule set without the Scanner rule still cannot get a miswired Scanner past the run gate.
    let lenient = ValidatorBuilder::empty()
        .with_rule(Box::new(SingletonRule::new(NodeKind::Start)))
        .with_rule(Box::new(SingletonRule::new(NodeKind::End)))
        .build();
    let mut state = raw_state(
        &[
            ("start", NodeKind::Start),
            ("live", NodeKind::Liveness),
            ("scan", NodeKind::Scanner),
            ("end", NodeKind::End),
        ],
        &[("start", "live"), ("live", "scan"), ("scan", "end")],
    );
    assert!(!validate(state.graph()).valid);
    assert!(lenient.validate(state.graph()).valid);

    let port = ScriptedPort::new();
    let calls = port.calls();
    let executor = Executor::builder(port).with_validator(lenient).build();
    let err = block_on(executor.run(&mut state)).unwrap_err();
    assert_eq!(
        err,
        RunError::ScannerWiring {
            node_id: "scan".to_string()
        }
    );
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(status_of(&state, "start"), NodeStatus::Idle);
}

#[test]
fn test_missing_endpoint_fails_the_step() {
    let mut state = chain(vec![
        WorkflowNode::new("start", NodeKind::Start),
        WorkflowNode::new("a", NodeKind::Liveness).without_endpoint(),
        WorkflowNode::new("end", NodeKind::End),
    ]);
    let port = ScriptedPort::new();
    let calls = port.calls();

    let outcome = block_on(Executor::new(port).run(&mut state)).unwrap();
    assert!(!outcome.is_completed());
    assert_eq!(status_of(&state, "a"), NodeStatus::Failed);
    assert_eq!(
        state.node("a").unwrap().error(),
        Some("Node 'a' has no API endpoint configured")
    );
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_reset_after_mixed_run() {
    let mut state = start_a_b_end();
    state
        .update_node(
            "a",
            serde_json::from_value(json!({ "inputs": { "retries": 0 } })).unwrap(),
        )
        .unwrap();
    let port = ScriptedPort::new()
        .respond("/api/a", json!({ "ok": true }))
        .fail("/api/b", "timeout");
    block_on(Executor::new(port).run(&mut state)).unwrap();
    assert_eq!(status_of(&state, "b"), NodeStatus::Failed);

    let before = state.graph().clone();
    reset(&mut state);

    for (node, old) in state.graph().nodes().iter().zip(before.nodes()) {
        assert_eq!(node.status(), NodeStatus::Idle);
        assert!(node.error().is_none());
        assert!(node.last_response().is_none());
        assert!(node.execution_time_ms().is_none());
        assert!(node.updated_at().is_none());

        assert_eq!(node.id, old.id);
        assert_eq!(node.kind, old.kind);
        assert_eq!(node.api_endpoint, old.api_endpoint);
        assert_eq!(node.inputs, old.inputs);
    }
    assert_eq!(state.node("a").unwrap().inputs["retries"], json!(0));
    assert!(state.execution_order().is_empty());
}

#[test]
fn test_rerun_after_failure_clears_previous_error() {
    let mut state = start_a_end();
    block_on(Executor::new(ScriptedPort::new().fail("/api/a", "down")).run(&mut state)).unwrap();
    assert_eq!(status_of(&state, "a"), NodeStatus::Failed);

    block_on(Executor::new(ScriptedPort::new().respond("/api/a", json!({}))).run(&mut state))
        .unwrap();
    assert_eq!(status_of(&state, "a"), NodeStatus::Success);
    assert!(state.node("a").unwrap().error().is_none());
}
