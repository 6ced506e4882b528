//! Typed structs representing a baseline snapshot.
//!
//! Token values are kept as `serde_json::Value`: the differ compares them
//! structurally and the reconciler coerces them by declared type, so no
//! single typed representation fits both consumers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Delimiter between the components of a [`PrefixedId`].
pub const KEY_DELIMITER: char = ':';

/// Stable identifier assigned by the design tool at variable creation.
///
/// Survives renames and path moves; the primary key for identity matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub String);

impl VariableId {
    pub fn new(id: impl Into<String>) -> Self {
        VariableId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableId {
    fn from(s: &str) -> Self {
        VariableId(s.to_string())
    }
}

/// Composite entry key `collection:mode:variableId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixedId {
    pub collection: String,
    pub mode: String,
    pub variable_id: VariableId,
}

impl PrefixedId {
    pub fn new(collection: &str, mode: &str, variable_id: &VariableId) -> Self {
        PrefixedId {
            collection: collection.to_string(),
            mode: mode.to_string(),
            variable_id: variable_id.clone(),
        }
    }

    /// Parse a `collection:mode:variableId` key.
    ///
    /// Returns `None` unless the key has exactly three non-empty components.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split(KEY_DELIMITER);
        let collection = parts.next()?;
        let mode = parts.next()?;
        let id = parts.next()?;
        if parts.next().is_some() || collection.is_empty() || mode.is_empty() || id.is_empty() {
            return None;
        }
        Some(PrefixedId {
            collection: collection.to_string(),
            mode: mode.to_string(),
            variable_id: VariableId::new(id),
        })
    }
}

impl fmt::Display for PrefixedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.collection, KEY_DELIMITER, self.mode, KEY_DELIMITER, self.variable_id
        )
    }
}

/// A single token value for one variable in one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub variable_id: VariableId,
    /// Dot-separated location, e.g. `colors.light.brand.primary`. Cosmetic and mutable.
    pub path: String,
    pub value: serde_json::Value,
    /// Declared token type as exported (`color`, `number`, `FLOAT`, ...).
    pub token_type: String,
    pub collection: String,
    pub mode: String,
    /// Design-tool identity of the collection, when the exporter recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Design-tool identity of the mode, when the exporter recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_id: Option<String>,
}

impl TokenEntry {
    pub fn prefixed_id(&self) -> PrefixedId {
        PrefixedId::new(&self.collection, &self.mode, &self.variable_id)
    }

    /// Path segments, skipping empty ones produced by stray dots.
    pub fn path_segments(&self) -> Vec<&str> {
        self.path.split('.').filter(|s| !s.is_empty()).collect()
    }

    /// Whether the value is an alias expression such as `{color.gray.50}`.
    pub fn is_alias(&self) -> bool {
        self.value.as_str().is_some_and(is_alias_expression)
    }
}

/// Returns true for `{a.b.c}` style reference expressions.
pub fn is_alias_expression(s: &str) -> bool {
    let t = s.trim();
    t.len() > 2 && t.starts_with('{') && t.ends_with('}')
}

/// Snapshot metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineMetadata {
    /// Semantic version of the token set this snapshot represents.
    pub version: Option<String>,
    /// ISO 8601 timestamp written by the exporter.
    pub exported_at: Option<String>,
    /// Identity of the source design file.
    pub source_identity: Option<String>,
}

/// A complete point-in-time export of the token graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineSnapshot {
    pub metadata: BaselineMetadata,
    pub entries: BTreeMap<PrefixedId, TokenEntry>,
}

impl BaselineSnapshot {
    pub fn new(metadata: BaselineMetadata) -> Self {
        BaselineSnapshot {
            metadata,
            entries: BTreeMap::new(),
        }
    }

    /// Insert an entry under its own prefixed id, replacing any previous one.
    pub fn insert(&mut self, entry: TokenEntry) {
        self.entries.insert(entry.prefixed_id(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.entries.values()
    }

    /// Every mode name that appears in at least one entry.
    pub fn mode_names(&self) -> BTreeSet<&str> {
        self.entries.values().map(|e| e.mode.as_str()).collect()
    }

    /// Collection names in first-seen key order.
    pub fn collection_names(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.entries
            .values()
            .filter(|e| seen.insert(e.collection.as_str()))
            .map(|e| e.collection.as_str())
            .collect()
    }
}
