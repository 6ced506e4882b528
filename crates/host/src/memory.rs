//! In-memory `HostGraph`.
//!
//! Used by tests and by the CLI, which persists the graph state as JSON
//! between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HostError;
use crate::record::{HostCollection, HostMode, HostValue, HostVariable, ValueKind};
use crate::traits::HostGraph;

/// Display name given to the implicit mode of a new collection.
pub const DEFAULT_MODE_NAME: &str = "Mode 1";

/// Serializable state behind a [`MemoryGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    pub collections: Vec<HostCollection>,
    pub variables: Vec<HostVariable>,
    pub source_identity: Option<String>,
    /// Monotonic counter used to mint ids.
    pub next_id: u64,
}

impl GraphState {
    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn collection_mut(&mut self, collection_id: &str) -> Result<&mut HostCollection, HostError> {
        self.collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| HostError::CollectionNotFound {
                collection_id: collection_id.to_string(),
            })
    }

    fn variable_mut(&mut self, variable_id: &str) -> Result<&mut HostVariable, HostError> {
        self.variables
            .iter_mut()
            .find(|v| v.id == variable_id)
            .ok_or_else(|| HostError::VariableNotFound {
                variable_id: variable_id.to_string(),
            })
    }
}

/// A `HostGraph` held entirely in memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    inner: Arc<Mutex<GraphState>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: GraphState) -> Self {
        MemoryGraph {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// A copy of the current state, for persistence or inspection.
    pub fn snapshot_state(&self) -> Result<GraphState, HostError> {
        Ok(self.state()?.clone())
    }

    pub fn from_json(text: &str) -> Result<Self, HostError> {
        let state: GraphState =
            serde_json::from_str(text).map_err(|e| HostError::Backend(e.to_string()))?;
        Ok(Self::from_state(state))
    }

    pub fn to_json(&self) -> Result<String, HostError> {
        let state = self.snapshot_state()?;
        serde_json::to_string_pretty(&state).map_err(|e| HostError::Backend(e.to_string()))
    }

    fn state(&self) -> Result<MutexGuard<'_, GraphState>, HostError> {
        self.inner
            .lock()
            .map_err(|_| HostError::Backend("graph state lock poisoned".to_string()))
    }
}

#[async_trait]
impl HostGraph for MemoryGraph {
    async fn list_collections(&self) -> Result<Vec<HostCollection>, HostError> {
        Ok(self.state()?.collections.clone())
    }

    async fn list_variables(&self) -> Result<Vec<HostVariable>, HostError> {
        Ok(self.state()?.variables.clone())
    }

    async fn source_identity(&self) -> Result<Option<String>, HostError> {
        Ok(self.state()?.source_identity.clone())
    }

    async fn create_collection(&self, name: &str) -> Result<HostCollection, HostError> {
        let mut state = self.state()?;
        let n = state.mint();
        let mode_id = format!("{}:0", n);
        let collection = HostCollection {
            id: format!("VariableCollectionId:{}", n),
            name: name.to_string(),
            original_id: None,
            modes: vec![HostMode {
                mode_id: mode_id.clone(),
                name: DEFAULT_MODE_NAME.to_string(),
                original_id: None,
            }],
            default_mode_id: mode_id,
        };
        state.collections.push(collection.clone());
        Ok(collection)
    }

    async fn add_mode(&self, collection_id: &str, name: &str) -> Result<HostMode, HostError> {
        let mut state = self.state()?;
        let n = state.mint();
        let collection = state.collection_mut(collection_id)?;
        let mode = HostMode {
            mode_id: format!("{}:{}", n, collection.modes.len()),
            name: name.to_string(),
            original_id: None,
        };
        collection.modes.push(mode.clone());
        Ok(mode)
    }

    async fn rename_mode(
        &self,
        collection_id: &str,
        mode_id: &str,
        name: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;
        let collection = state.collection_mut(collection_id)?;
        let mode = collection
            .modes
            .iter_mut()
            .find(|m| m.mode_id == mode_id)
            .ok_or_else(|| HostError::ModeNotFound {
                collection_id: collection_id.to_string(),
                mode_id: mode_id.to_string(),
            })?;
        mode.name = name.to_string();
        Ok(())
    }

    async fn create_variable(
        &self,
        name: &str,
        collection_id: &str,
        kind: ValueKind,
    ) -> Result<HostVariable, HostError> {
        let mut state = self.state()?;
        state.collection_mut(collection_id)?;
        let n = state.mint();
        let variable = HostVariable {
            id: format!("VariableID:{}", n),
            name: name.to_string(),
            collection_id: collection_id.to_string(),
            kind,
            original_id: None,
            values: BTreeMap::new(),
        };
        state.variables.push(variable.clone());
        Ok(variable)
    }

    async fn rename_variable(&self, variable_id: &str, name: &str) -> Result<(), HostError> {
        let mut state = self.state()?;
        state.variable_mut(variable_id)?.name = name.to_string();
        Ok(())
    }

    async fn set_value_for_mode(
        &self,
        variable_id: &str,
        mode_id: &str,
        value: HostValue,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;

        let collection_id = state
            .variables
            .iter()
            .find(|v| v.id == variable_id)
            .map(|v| v.collection_id.clone())
            .ok_or_else(|| HostError::VariableNotFound {
                variable_id: variable_id.to_string(),
            })?;
        let has_mode = state
            .collection_mut(&collection_id)?
            .modes
            .iter()
            .any(|m| m.mode_id == mode_id);
        if !has_mode {
            return Err(HostError::ModeNotFound {
                collection_id,
                mode_id: mode_id.to_string(),
            });
        }

        let variable = state.variable_mut(variable_id)?;
        if let Some(found) = value.kind() {
            if found != variable.kind {
                return Err(HostError::KindMismatch {
                    variable_id: variable_id.to_string(),
                    expected: variable.kind,
                    found,
                });
            }
        }
        variable.values.insert(mode_id.to_string(), value);
        Ok(())
    }

    async fn set_collection_origin(
        &self,
        collection_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;
        state.collection_mut(collection_id)?.original_id = Some(original_id.to_string());
        Ok(())
    }

    async fn set_mode_origin(
        &self,
        collection_id: &str,
        mode_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;
        let collection = state.collection_mut(collection_id)?;
        let mode = collection
            .modes
            .iter_mut()
            .find(|m| m.mode_id == mode_id)
            .ok_or_else(|| HostError::ModeNotFound {
                collection_id: collection_id.to_string(),
                mode_id: mode_id.to_string(),
            })?;
        mode.original_id = Some(original_id.to_string());
        Ok(())
    }

    async fn set_variable_origin(
        &self,
        variable_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state()?;
        state.variable_mut(variable_id)?.original_id = Some(original_id.to_string());
        Ok(())
    }

    async fn set_source_identity(&self, identity: &str) -> Result<(), HostError> {
        self.state()?.source_identity = Some(identity.to_string());
        Ok(())
    }
}
