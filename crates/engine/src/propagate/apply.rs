use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::scan::{read_text, Matcher};
use super::{PlatformConfig, RenameMapping};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Count replacements without writing anything.
    pub dry_run: bool,
}

/// Replacements made (or, in a dry run, that would be made) in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub replacements: usize,
}

/// A failure confined to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWriteError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub files_modified: Vec<FileReport>,
    pub total_replacements: usize,
    pub errors: Vec<FileWriteError>,
    pub dry_run: bool,
}

impl ApplyReport {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_text(&self) -> String {
        let verb = if self.dry_run { "Would update" } else { "Updated" };
        let mut lines = vec![format!(
            "{} {} file(s), {} replacement(s)",
            verb,
            self.files_modified.len(),
            self.total_replacements
        )];
        for f in &self.files_modified {
            lines.push(format!("  {} ({})", f.path.display(), f.replacements));
        }
        if !self.errors.is_empty() {
            lines.push(String::new());
            lines.push(format!("Errors ({}):", self.errors.len()));
            for e in &self.errors {
                lines.push(format!("  {}: {}", e.path.display(), e.message));
            }
        }
        lines.join("\n")
    }
}

/// Rewrite old identifiers in `files`.
///
/// Each unique path is handled by exactly one task and all tasks run
/// concurrently. A failure in one file is recorded in the report and
/// does not stop the others. Files without matches are left untouched
/// and do not appear in the report.
pub async fn apply(
    mappings: &[RenameMapping],
    platform: &PlatformConfig,
    files: &[PathBuf],
    options: ApplyOptions,
) -> ApplyReport {
    let mut report = ApplyReport {
        dry_run: options.dry_run,
        ..ApplyReport::default()
    };
    let Some(matcher) = Matcher::new(mappings, platform) else {
        return report;
    };
    let matcher = Arc::new(matcher);

    let unique: BTreeSet<&PathBuf> = files.iter().collect();
    let mut tasks = JoinSet::new();
    for path in unique {
        let matcher = Arc::clone(&matcher);
        let path = path.clone();
        tasks.spawn(async move { rewrite_file(&matcher, path, options.dry_run).await });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(Some(file))) => {
                report.total_replacements += file.replacements;
                report.files_modified.push(file);
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                tracing::warn!("Failed to rewrite {}: {}", e.path.display(), e.message);
                report.errors.push(e);
            }
            Err(join_err) => report.errors.push(FileWriteError {
                path: PathBuf::new(),
                message: format!("rewrite task failed: {}", join_err),
            }),
        }
    }

    report.files_modified.sort_by(|a, b| a.path.cmp(&b.path));
    report.errors.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(
        "{} {} replacement(s) across {} file(s)",
        if options.dry_run { "Found" } else { "Applied" },
        report.total_replacements,
        report.files_modified.len()
    );
    report
}

async fn rewrite_file(
    matcher: &Matcher,
    path: PathBuf,
    dry_run: bool,
) -> Result<Option<FileReport>, FileWriteError> {
    let fail = |path: &PathBuf, e: std::io::Error| FileWriteError {
        path: path.clone(),
        message: e.to_string(),
    };
    let text = read_text(&path).await.map_err(|e| fail(&path, e))?;
    let (rewritten, replacements) = matcher.replace(&text);
    if replacements == 0 {
        return Ok(None);
    }
    if !dry_run {
        tokio::fs::write(&path, rewritten)
            .await
            .map_err(|e| fail(&path, e))?;
    }
    tracing::debug!("{}: {} replacement(s)", path.display(), replacements);
    Ok(Some(FileReport { path, replacements }))
}
