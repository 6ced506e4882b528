use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use tokensync_interchange::{BaselineSnapshot, TokenEntry, VariableId};

/// A variable whose value changed in one mode while its path stayed put.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChange {
    pub variable_id: VariableId,
    pub collection: String,
    pub mode: String,
    pub path: String,
    pub before: Value,
    pub after: Value,
}

/// A variable whose path moved in one mode. Always breaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathChange {
    pub variable_id: VariableId,
    pub collection: String,
    pub mode: String,
    pub old_path: String,
    pub new_path: String,
}

/// An added or deleted (variable, mode) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableRef {
    pub variable_id: VariableId,
    pub collection: String,
    pub mode: String,
    pub path: String,
}

impl From<&TokenEntry> for VariableRef {
    fn from(e: &TokenEntry) -> Self {
        VariableRef {
            variable_id: e.variable_id.clone(),
            collection: e.collection.clone(),
            mode: e.mode.clone(),
            path: e.path.clone(),
        }
    }
}

/// The categorized result of diffing two baselines.
///
/// The categories are disjoint: a `(variable, mode)` pair lands in at most
/// one list, and entries that vanished with their whole mode are reported
/// only through `deleted_mode_names`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub value_changes: Vec<ValueChange>,
    pub path_changes: Vec<PathChange>,
    pub new_variables: Vec<VariableRef>,
    pub deleted_variables: Vec<VariableRef>,
    pub new_mode_names: Vec<String>,
    pub deleted_mode_names: Vec<String>,
}

impl ChangeSet {
    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.value_changes.is_empty()
            && self.path_changes.is_empty()
            && self.new_variables.is_empty()
            && self.deleted_variables.is_empty()
            && self.new_mode_names.is_empty()
            && self.deleted_mode_names.is_empty()
    }

    /// Total number of individual changes across all categories.
    pub fn len(&self) -> usize {
        self.value_changes.len()
            + self.new_variables.len()
            + self.new_mode_names.len()
            + self.breaking_count()
    }

    /// Number of changes that invalidate a previously valid reference.
    pub fn breaking_count(&self) -> usize {
        self.path_changes.len() + self.deleted_variables.len() + self.deleted_mode_names.len()
    }

    pub fn has_breaking(&self) -> bool {
        self.breaking_count() > 0
    }

    pub fn has_additions(&self) -> bool {
        !self.new_variables.is_empty() || !self.new_mode_names.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Format the change set as human-readable text, one change per line.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        for m in &self.deleted_mode_names {
            lines.push(format!("- mode {}", m));
        }
        for m in &self.new_mode_names {
            lines.push(format!("+ mode {}", m));
        }
        for p in &self.path_changes {
            lines.push(format!(
                "> {}:{}:{} {} -> {}",
                p.collection, p.mode, p.variable_id, p.old_path, p.new_path
            ));
        }
        for v in &self.deleted_variables {
            lines.push(format!("- {}:{}:{} {}", v.collection, v.mode, v.variable_id, v.path));
        }
        for v in &self.new_variables {
            lines.push(format!("+ {}:{}:{} {}", v.collection, v.mode, v.variable_id, v.path));
        }
        for c in &self.value_changes {
            let before = serde_json::to_string(&c.before).unwrap_or_default();
            let after = serde_json::to_string(&c.after).unwrap_or_default();
            lines.push(format!(
                "~ {}:{}:{} {}: {} -> {}",
                c.collection, c.mode, c.variable_id, c.path, before, after
            ));
        }

        lines.join("\n")
    }
}

/// Normalize a token value for structural comparison.
///
/// Objects already compare by key regardless of order. Hex colour strings
/// are lowercased and numbers are compared as floats, so `#FFF`/`#fff` and
/// `1`/`1.0` are the same value. Array order is significant.
fn normalize_for_comparison(value: &Value) -> Value {
    match value {
        Value::String(s) if looks_like_hex_color(s) => Value::String(s.to_ascii_lowercase()),
        Value::Number(n) => n
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_for_comparison).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_for_comparison(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn looks_like_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Structural equality of two token values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    normalize_for_comparison(a) == normalize_for_comparison(b)
}

/// Diff two baselines by stable variable identity.
///
/// Entries are matched by `(variableId, mode)`, never by path: a path that
/// moved is a `PathChange`, not a delete plus an add. Output lists follow
/// the snapshots' key order (collection, mode, variable id).
pub fn diff_baselines(old: &BaselineSnapshot, new: &BaselineSnapshot) -> ChangeSet {
    let mut index: BTreeMap<&VariableId, BTreeMap<&str, &TokenEntry>> = BTreeMap::new();
    for entry in old.iter() {
        index
            .entry(&entry.variable_id)
            .or_default()
            .insert(entry.mode.as_str(), entry);
    }

    let old_modes = old.mode_names();
    let new_modes = new.mode_names();
    let new_ids: BTreeSet<&VariableId> = new.iter().map(|e| &e.variable_id).collect();

    let mut changes = ChangeSet {
        new_mode_names: new_modes
            .difference(&old_modes)
            .map(|m| m.to_string())
            .collect(),
        deleted_mode_names: old_modes
            .difference(&new_modes)
            .map(|m| m.to_string())
            .collect(),
        ..ChangeSet::default()
    };

    for entry in new.iter() {
        let Some(by_mode) = index.get(&entry.variable_id) else {
            changes.new_variables.push(VariableRef::from(entry));
            continue;
        };

        match by_mode.get(entry.mode.as_str()) {
            // A known variable gaining a value in a mode nobody had before is
            // covered by the mode addition itself.
            None if !old_modes.contains(entry.mode.as_str()) => {}
            None => changes.new_variables.push(VariableRef::from(entry)),
            Some(before) if before.path != entry.path => {
                changes.path_changes.push(PathChange {
                    variable_id: entry.variable_id.clone(),
                    collection: entry.collection.clone(),
                    mode: entry.mode.clone(),
                    old_path: before.path.clone(),
                    new_path: entry.path.clone(),
                });
            }
            Some(before) if !values_equal(&before.value, &entry.value) => {
                changes.value_changes.push(ValueChange {
                    variable_id: entry.variable_id.clone(),
                    collection: entry.collection.clone(),
                    mode: entry.mode.clone(),
                    path: entry.path.clone(),
                    before: before.value.clone(),
                    after: entry.value.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for entry in old.iter() {
        if new_ids.contains(&entry.variable_id) {
            continue;
        }
        if changes.deleted_mode_names.iter().any(|m| *m == entry.mode) {
            continue;
        }
        changes.deleted_variables.push(VariableRef::from(entry));
    }

    changes
}
