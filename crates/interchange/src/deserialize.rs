//! Ingestion of baseline JSON into typed snapshots.
//!
//! The main entry point is [`parse_baseline`], which takes a
//! `&serde_json::Value` and produces a [`BaselineSnapshot`]. Two historical
//! entry shapes are accepted and normalized here:
//!
//! - `{ "path", "value", "type", "collection", "mode" }`
//! - `{ "path", "$value", "$type", "collectionName", "modeName" }`

use serde_json::{json, Map, Value};

use crate::types::*;

/// Errors during baseline deserialization.
///
/// Every variant is fatal: a snapshot that fails ingestion must not reach
/// any component that mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The snapshot is missing a required top-level field.
    #[error("baseline missing required field: '{field}'")]
    MissingField { field: String },

    /// An entry key is not of the form `collection:mode:variableId`.
    #[error("invalid entry key '{0}': expected 'collection:mode:variableId'")]
    InvalidKey(String),

    /// An entry is structurally invalid.
    #[error("entry '{key}': {message}")]
    InvalidEntry { key: String, message: String },

    /// The payload is not JSON at all.
    #[error("invalid baseline JSON: {0}")]
    Json(String),
}

/// Parse a baseline from its serialized text.
pub fn from_json_str(text: &str) -> Result<BaselineSnapshot, InterchangeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| InterchangeError::Json(e.to_string()))?;
    parse_baseline(&value)
}

/// Deserialize a baseline JSON document into a typed snapshot.
///
/// Requires the top-level `metadata` and `entries` objects. Entry fields
/// that repeat information from the key (collection, mode, variable id)
/// must agree with it.
pub fn parse_baseline(doc: &Value) -> Result<BaselineSnapshot, InterchangeError> {
    let metadata_obj = doc
        .get("metadata")
        .and_then(|m| m.as_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "metadata".to_string(),
        })?;

    let entries_obj = doc
        .get("entries")
        .and_then(|e| e.as_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "entries".to_string(),
        })?;

    let mut snapshot = BaselineSnapshot::new(parse_metadata(metadata_obj));

    for (key, raw) in entries_obj {
        let entry = parse_entry(key, raw)?;
        snapshot.insert(entry);
    }

    Ok(snapshot)
}

/// Serialize a snapshot back into the canonical wire shape.
pub fn to_baseline_json(snapshot: &BaselineSnapshot) -> Value {
    let mut entries = Map::new();
    for (key, entry) in &snapshot.entries {
        let mut obj = Map::new();
        obj.insert("path".to_string(), json!(entry.path));
        obj.insert("value".to_string(), entry.value.clone());
        obj.insert("type".to_string(), json!(entry.token_type));
        obj.insert("collection".to_string(), json!(entry.collection));
        obj.insert("mode".to_string(), json!(entry.mode));
        if let Some(id) = &entry.collection_id {
            obj.insert("collectionId".to_string(), json!(id));
        }
        if let Some(id) = &entry.mode_id {
            obj.insert("modeId".to_string(), json!(id));
        }
        entries.insert(key.to_string(), Value::Object(obj));
    }

    let meta = &snapshot.metadata;
    json!({
        "metadata": {
            "version": meta.version,
            "exportedAt": meta.exported_at,
            "sourceIdentity": meta.source_identity,
        },
        "entries": entries,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn parse_metadata(obj: &Map<String, Value>) -> BaselineMetadata {
    BaselineMetadata {
        version: first_str(obj, &["version"]),
        exported_at: first_str(obj, &["exportedAt", "exported_at"]),
        source_identity: first_str(obj, &["sourceIdentity", "fileIdentity", "fileKey"]),
    }
}

fn parse_entry(key: &str, raw: &Value) -> Result<TokenEntry, InterchangeError> {
    let prefixed =
        PrefixedId::parse(key).ok_or_else(|| InterchangeError::InvalidKey(key.to_string()))?;

    let obj = raw.as_object().ok_or_else(|| invalid(key, "entry is not an object"))?;

    let path = first_str(obj, &["path"]).ok_or_else(|| invalid(key, "missing 'path'"))?;

    let value = first_value(obj, &["value", "$value"])
        .cloned()
        .ok_or_else(|| invalid(key, "missing 'value'"))?;

    let token_type =
        first_str(obj, &["type", "$type"]).ok_or_else(|| invalid(key, "missing 'type'"))?;

    let collection = agree(
        key,
        "collection",
        first_str(obj, &["collection", "collectionName"]),
        &prefixed.collection,
    )?;
    let mode = agree(
        key,
        "mode",
        first_str(obj, &["mode", "modeName"]),
        &prefixed.mode,
    )?;
    let variable_id = agree(
        key,
        "variableId",
        first_str(obj, &["variableId", "id"]),
        prefixed.variable_id.as_str(),
    )?;

    Ok(TokenEntry {
        variable_id: VariableId::new(variable_id),
        path,
        value,
        token_type,
        collection,
        mode,
        collection_id: first_str(obj, &["collectionId"]),
        mode_id: first_str(obj, &["modeId"]),
    })
}

/// A field that restates a key component must match it exactly.
fn agree(
    key: &str,
    field: &str,
    declared: Option<String>,
    from_key: &str,
) -> Result<String, InterchangeError> {
    match declared {
        Some(d) if d != from_key => Err(invalid(
            key,
            &format!("'{}' is '{}' but the key says '{}'", field, d, from_key),
        )),
        _ => Ok(from_key.to_string()),
    }
}

fn first_value<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n))
}

fn first_str(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| obj.get(*n).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn invalid(key: &str, message: &str) -> InterchangeError {
    InterchangeError::InvalidEntry {
        key: key.to_string(),
        message: message.to_string(),
    }
}
