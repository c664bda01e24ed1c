//! Converting workflows to and from JSON: export/import documents and slot persistence.

pub mod export;
pub mod import;
pub mod store;

pub use export::*;
pub use import::*;
pub use store::*;
