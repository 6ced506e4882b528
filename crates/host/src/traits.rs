use async_trait::async_trait;

use crate::error::HostError;
use crate::record::{HostCollection, HostMode, HostValue, HostVariable, ValueKind};

/// The live token graph owned by the host (design tool, plugin bridge, or
/// an in-memory stand-in).
///
/// Every call may cross a process or thread boundary, so the reconciler
/// never assumes synchronous completion and awaits each call before
/// matching logic that depends on it.
///
/// ## Creation semantics
///
/// `create_collection` returns a collection that already owns exactly one
/// implicit default mode. Importers rename that mode for the first incoming
/// mode rather than adding a second one.
///
/// ## Origin metadata
///
/// `original_id` on collections, modes, and variables is opaque metadata
/// written by an importer. It survives renames and is the first key used
/// for handshake matching on the next import.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so a reconciliation can run on
/// any runtime worker.
#[async_trait]
pub trait HostGraph: Send + Sync {
    // ── Reads ────────────────────────────────────────────────────────────────

    /// All collections, in creation order.
    async fn list_collections(&self) -> Result<Vec<HostCollection>, HostError>;

    /// All variables across all collections, in creation order.
    async fn list_variables(&self) -> Result<Vec<HostVariable>, HostError>;

    /// Identity of the source file the graph was last imported from.
    async fn source_identity(&self) -> Result<Option<String>, HostError>;

    // ── Collections and modes ────────────────────────────────────────────────

    /// Create a collection with one implicit default mode.
    async fn create_collection(&self, name: &str) -> Result<HostCollection, HostError>;

    /// Append a mode to a collection.
    ///
    /// Returns `Err(HostError::CollectionNotFound)` for an unknown collection.
    async fn add_mode(&self, collection_id: &str, name: &str) -> Result<HostMode, HostError>;

    /// Change the display name of a mode. Its id and origin are unaffected.
    async fn rename_mode(
        &self,
        collection_id: &str,
        mode_id: &str,
        name: &str,
    ) -> Result<(), HostError>;

    // ── Variables ────────────────────────────────────────────────────────────

    /// Create a variable of the given kind in a collection. No mode holds a
    /// value until `set_value_for_mode` is called.
    async fn create_variable(
        &self,
        name: &str,
        collection_id: &str,
        kind: ValueKind,
    ) -> Result<HostVariable, HostError>;

    /// Change the display name of a variable.
    async fn rename_variable(&self, variable_id: &str, name: &str) -> Result<(), HostError>;

    /// Set the value a variable holds in one mode of its collection.
    ///
    /// Concrete values must match the variable's kind
    /// (`HostError::KindMismatch` otherwise); aliases are always accepted.
    async fn set_value_for_mode(
        &self,
        variable_id: &str,
        mode_id: &str,
        value: HostValue,
    ) -> Result<(), HostError>;

    // ── Origin metadata ──────────────────────────────────────────────────────

    async fn set_collection_origin(
        &self,
        collection_id: &str,
        original_id: &str,
    ) -> Result<(), HostError>;

    async fn set_mode_origin(
        &self,
        collection_id: &str,
        mode_id: &str,
        original_id: &str,
    ) -> Result<(), HostError>;

    async fn set_variable_origin(
        &self,
        variable_id: &str,
        original_id: &str,
    ) -> Result<(), HostError>;

    /// Record the identity of the source file the graph was imported from.
    async fn set_source_identity(&self, identity: &str) -> Result<(), HostError>;
}
