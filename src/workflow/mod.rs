//! The workflow graph model: typed nodes and edges plus the shared state container.

pub mod edge;
pub mod graph;
pub mod node;
pub mod state;

pub use edge::*;
pub use graph::*;
pub use node::*;
pub use state::*;
