use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::diff::ChangeSet;
use super::version::{Version, VersionError};

/// Size of a release, ordered so the maximum over a set of changes is the
/// release size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Identical snapshots; no release.
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::None => write!(f, "none"),
            ChangeType::Patch => write!(f, "patch"),
            ChangeType::Minor => write!(f, "minor"),
            ChangeType::Major => write!(f, "major"),
        }
    }
}

/// What happened to a single token or mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    PathChanged,
    VariableDeleted,
    ModeDeleted,
    VariableAdded,
    ModeAdded,
    ValueChanged,
}

impl ChangeKind {
    /// The release size this kind of change requires on its own.
    pub fn change_type(self) -> ChangeType {
        match self {
            ChangeKind::PathChanged | ChangeKind::VariableDeleted | ChangeKind::ModeDeleted => {
                ChangeType::Major
            }
            ChangeKind::VariableAdded | ChangeKind::ModeAdded => ChangeType::Minor,
            ChangeKind::ValueChanged => ChangeType::Patch,
        }
    }

    pub fn is_breaking(self) -> bool {
        self.change_type() == ChangeType::Major
    }
}

/// One classified change, flattened out of a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenChange {
    pub kind: ChangeKind,
    pub breaking: bool,
    /// `collection:mode:variableId` for variable changes, the mode name for mode changes.
    pub target: String,
    pub description: String,
}

impl TokenChange {
    fn new(kind: ChangeKind, target: String, description: String) -> Self {
        TokenChange {
            kind,
            breaking: kind.is_breaking(),
            target,
            description,
        }
    }
}

/// A recommended version bump. The classifier only recommends; callers may
/// substitute their own version with [`VersionBump::with_suggested`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionBump {
    pub current: Version,
    pub suggested: Version,
    pub change_type: ChangeType,
    pub changes: Vec<TokenChange>,
}

impl VersionBump {
    /// Whether any release is warranted.
    pub fn is_bump(&self) -> bool {
        self.change_type != ChangeType::None
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &TokenChange> {
        self.changes.iter().filter(|c| c.breaking)
    }

    /// Replace the suggested version with a caller-chosen one.
    pub fn with_suggested(mut self, version: Version) -> Self {
        self.suggested = version;
        self
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Format as human-readable text, breaking changes first.
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!(
            "{} -> {} ({})",
            self.current, self.suggested, self.change_type
        )];

        let breaking: Vec<&TokenChange> = self.breaking_changes().collect();
        if !breaking.is_empty() {
            lines.push(String::new());
            lines.push(format!("BREAKING ({}):", breaking.len()));
            for c in breaking {
                lines.push(format!("  {}: {}", c.target, c.description));
            }
        }

        let other: Vec<&TokenChange> = self.changes.iter().filter(|c| !c.breaking).collect();
        if !other.is_empty() {
            lines.push(String::new());
            lines.push(format!("NON_BREAKING ({}):", other.len()));
            for c in other {
                lines.push(format!("  {}: {}", c.target, c.description));
            }
        }

        lines.join("\n")
    }
}

/// Derive a version bump from a change set.
///
/// Strict precedence: any path change, deleted mode, or deleted variable
/// forces `major`; otherwise any addition forces `minor`; otherwise any
/// value change is a `patch`; otherwise there is no bump. Fails only when
/// the bumped component would overflow.
pub fn classify(changes: &ChangeSet, current: Version) -> Result<VersionBump, VersionError> {
    let change_type = if !changes.path_changes.is_empty()
        || !changes.deleted_mode_names.is_empty()
        || !changes.deleted_variables.is_empty()
    {
        ChangeType::Major
    } else if !changes.new_variables.is_empty() || !changes.new_mode_names.is_empty() {
        ChangeType::Minor
    } else if !changes.value_changes.is_empty() {
        ChangeType::Patch
    } else {
        ChangeType::None
    };

    let suggested = match change_type {
        ChangeType::Major => current.bump_major()?,
        ChangeType::Minor => current.bump_minor()?,
        ChangeType::Patch => current.bump_patch()?,
        ChangeType::None => current,
    };

    Ok(VersionBump {
        current,
        suggested,
        change_type,
        changes: flatten(changes),
    })
}

/// Flatten a change set into classified changes, breaking kinds first.
fn flatten(changes: &ChangeSet) -> Vec<TokenChange> {
    let mut out = Vec::new();

    for p in &changes.path_changes {
        out.push(TokenChange::new(
            ChangeKind::PathChanged,
            format!("{}:{}:{}", p.collection, p.mode, p.variable_id),
            format!("moved from '{}' to '{}'", p.old_path, p.new_path),
        ));
    }
    for m in &changes.deleted_mode_names {
        out.push(TokenChange::new(
            ChangeKind::ModeDeleted,
            m.clone(),
            "mode removed with all of its values".to_string(),
        ));
    }
    for v in &changes.deleted_variables {
        out.push(TokenChange::new(
            ChangeKind::VariableDeleted,
            format!("{}:{}:{}", v.collection, v.mode, v.variable_id),
            format!("'{}' removed", v.path),
        ));
    }
    for m in &changes.new_mode_names {
        out.push(TokenChange::new(
            ChangeKind::ModeAdded,
            m.clone(),
            "mode added".to_string(),
        ));
    }
    for v in &changes.new_variables {
        out.push(TokenChange::new(
            ChangeKind::VariableAdded,
            format!("{}:{}:{}", v.collection, v.mode, v.variable_id),
            format!("'{}' added", v.path),
        ));
    }
    for c in &changes.value_changes {
        out.push(TokenChange::new(
            ChangeKind::ValueChanged,
            format!("{}:{}:{}", c.collection, c.mode, c.variable_id),
            format!("'{}' changed value", c.path),
        ));
    }

    out
}
