use crate::record::ValueKind;

/// All errors that can be returned by a HostGraph implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// No collection with the given id exists in the graph.
    #[error("collection not found: {collection_id}")]
    CollectionNotFound { collection_id: String },

    /// The collection exists but has no mode with the given id.
    #[error("mode not found: {collection_id}/{mode_id}")]
    ModeNotFound {
        collection_id: String,
        mode_id: String,
    },

    /// No variable with the given id exists in the graph.
    #[error("variable not found: {variable_id}")]
    VariableNotFound { variable_id: String },

    /// A concrete value of the wrong kind was written to a variable.
    /// Alias values are accepted for every kind.
    #[error("variable {variable_id} holds {expected} values, got {found}")]
    KindMismatch {
        variable_id: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A backend-specific failure (host bridge, serialization, lock poisoning).
    #[error("host backend error: {0}")]
    Backend(String),
}
