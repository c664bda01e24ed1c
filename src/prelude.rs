//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the kensa
//! crate. Import it to get the graph model, the validator, the executor and the
//! serializer without naming each module.
//!
//! # Example
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/workflow.json")?;
//! let mut state = WorkflowState::default();
//! import_workflow(&mut state, &json)?;
//!
//! let report = validate(state.graph());
//! println!("{}", RunFormatter::format_report(&report));
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::workflow::{
    NodeId, NodeKind, NodePatch, NodeStatus, Position, WorkflowEdge, WorkflowGraph,
    WorkflowNode, WorkflowState,
};

// Validation and ordering
pub use crate::scheduler::{Schedule, execution_order};
pub use crate::validator::{ValidationReport, Validator, check_connection, validate};

// Execution
pub use crate::executor::{
    ExecutionPort, ExecutionResponse, Executor, RunOutcome, SimulatedBackend, reset,
};

// Serialization and persistence
pub use crate::serializer::{
    ExportDocument, FileStore, MemoryStore, WorkflowStore, export_json, export_workflow,
    import_workflow, load_workflow, parse_workflow, save_workflow,
};

// Error types
pub use crate::error::{
    ConnectionRejected, GraphError, ImportError, PortError, RunError, StoreError,
};

// Run summaries
pub use crate::trace::RunFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
