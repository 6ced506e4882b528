use serde::Serialize;
use serde_json::Value;

use tokensync_interchange::BaselineSnapshot;

use crate::classify::{classify, VersionBump};
use crate::diff::{diff_baselines, ChangeSet};
use crate::error::EngineError;
use crate::version::Version;

/// The outcome of gating a release: what changed and the version it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleasePlan {
    pub changes: ChangeSet,
    pub bump: VersionBump,
}

impl ReleasePlan {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_text(&self) -> String {
        format!("{}\n\n{}", self.bump.to_text(), self.changes.to_text())
    }
}

/// Diff, classify, and gate a release.
///
/// `current` defaults to the old snapshot's recorded version, then to
/// `0.0.0`. Breaking changes stop the release with
/// [`EngineError::BreakingChangeBlocked`] unless `force` is set; nothing
/// downstream of the diff should run in that case.
pub fn plan_release(
    old: &BaselineSnapshot,
    new: &BaselineSnapshot,
    current: Option<&str>,
    force: bool,
) -> Result<ReleasePlan, EngineError> {
    let current = Version::parse_or_default(current.or(old.metadata.version.as_deref()))?;
    let changes = diff_baselines(old, new);

    if changes.has_breaking() && !force {
        let breaking_count = changes.breaking_count();
        tracing::warn!("Release blocked by {} breaking change(s)", breaking_count);
        return Err(EngineError::BreakingChangeBlocked { breaking_count });
    }

    let bump = classify(&changes, current)?;
    tracing::info!(
        "Release plan: {} -> {} ({})",
        bump.current,
        bump.suggested,
        bump.change_type
    );
    Ok(ReleasePlan { changes, bump })
}
