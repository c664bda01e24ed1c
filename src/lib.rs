//! # Kensa - Identity-Verification Workflow Engine
//!
//! **Kensa** runs directed graphs of identity-verification steps (liveness checks,
//! card captures, document scans) that users assemble on a visual canvas. The canvas
//! only edits the graph and renders node status; everything with real rules lives
//! here.
//!
//! ## Core Workflow
//!
//! 1.  **Build the graph**: Add nodes to a [`WorkflowState`](workflow::WorkflowState) and wire them with
//!     `connect`, which rejects illegal Scanner wiring before the edge exists.
//! 2.  **Validate**: [`validate`](validator::validate) checks Start/End counts and Scanner wiring and
//!     reports every problem at once.
//! 3.  **Run**: An [`Executor`](executor::Executor) orders the nodes topologically and calls an
//!     [`ExecutionPort`](executor::ExecutionPort) for each service step, one at a time. The first
//!     failing step halts the run; earlier results stay on their nodes.
//! 4.  **Persist**: Export to the shareable labelled JSON format, import either format
//!     back, or save/load the raw graph through a [`WorkflowStore`](serializer::WorkflowStore).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut state = WorkflowState::new("Onboarding");
//!     state.add_node(WorkflowNode::new("start", NodeKind::Start))?;
//!     state.add_node(WorkflowNode::new("liveness", NodeKind::Liveness))?;
//!     state.add_node(WorkflowNode::new("capture", NodeKind::CardCapture))?;
//!     state.add_node(WorkflowNode::new("scan", NodeKind::Scanner))?;
//!     state.add_node(WorkflowNode::new("end", NodeKind::End))?;
//!
//!     state.connect("start", "liveness")?;
//!     state.connect("liveness", "capture")?;
//!     state.connect("capture", "scan")?;
//!     state.connect("scan", "end")?;
//!
//!     // A Scanner may only be fed by a Card Capture node.
//!     assert!(state.connect("liveness", "scan").is_err());
//!
//!     let executor = Executor::new(SimulatedBackend::default());
//!     let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
//!     let outcome = runtime.block_on(executor.run(&mut state))?;
//!
//!     println!("{}", RunFormatter::format_outcome(&outcome));
//!     println!("{}", RunFormatter::format_state(&state));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;
pub mod serializer;
pub mod trace;
pub mod validator;
pub mod workflow;
