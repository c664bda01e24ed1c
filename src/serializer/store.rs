use crate::error::StoreError;
use crate::workflow::{GraphParts, WorkflowGraph, WorkflowState};
use ahash::AHashMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

pub const DEFAULT_SLOT: &str = "identity-workflow";

/// Opaque key/JSON-blob persistence.
pub trait WorkflowStore: Send + Sync {
    fn save(&self, key: &str, blob: &Value) -> Result<(), StoreError>;

    /// Returns `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

/// Keeps blobs as JSON text in memory, the way a browser's local storage would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<AHashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `key` without checking it is JSON.
    pub fn insert_raw(&self, key: impl Into<String>, text: impl Into<String>) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), text.into());
    }
}

impl WorkflowStore for MemoryStore {
    fn save(&self, key: &str, blob: &Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(blob)?;
        self.insert_raw(key, text);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(key)
            .map(|text| serde_json::from_str(text).map_err(StoreError::from))
            .transpose()
    }
}

/// One `<key>.json` file per slot under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a slot key to `<root>/<key>.json`.
    ///
    /// Keys must be non-empty and made of ASCII letters, digits, `_` and `-`, so two
    /// distinct keys never share a file.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl WorkflowStore for FileStore {
    fn save(&self, key: &str, blob: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        })?;
        let text = serde_json::to_string_pretty(blob)?;
        fs::write(&path, text).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Workflow blob written");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

/// Persists the full `{ nodes, edges }` graph to `slot`, with every node reset to idle.
///
/// The live state keeps its run results; only the stored copy is reset.
pub fn save_workflow(
    state: &WorkflowState,
    store: &dyn WorkflowStore,
    slot: &str,
) -> Result<(), StoreError> {
    let mut graph = state.graph().clone();
    graph.clear_run_state();
    let blob = serde_json::to_value(graph.into_parts())?;
    store.save(slot, &blob)?;
    info!(slot, nodes = state.graph().nodes().len(), "Workflow saved");
    Ok(())
}

/// Reads `slot` back and replaces the graph wholesale.
///
/// Returns `Ok(false)` when the slot is empty. A blob lacking `nodes` or `edges`,
/// or one that is not valid JSON, is an error and leaves the state unchanged.
pub fn load_workflow(
    state: &mut WorkflowState,
    store: &dyn WorkflowStore,
    slot: &str,
) -> Result<bool, StoreError> {
    let Some(blob) = store.load(slot)? else {
        debug!(slot, "Nothing saved in slot");
        return Ok(false);
    };
    if blob.get("nodes").is_none() || blob.get("edges").is_none() {
        return Err(StoreError::MissingGraph(slot.to_string()));
    }

    let parts: GraphParts = serde_json::from_value(blob)?;
    let graph = WorkflowGraph::from_parts(parts.nodes, parts.edges).map_err(|source| {
        StoreError::Inconsistent {
            slot: slot.to_string(),
            source,
        }
    })?;
    info!(slot, nodes = graph.nodes().len(), "Workflow loaded");
    state.replace_graph(graph);
    Ok(true)
}
