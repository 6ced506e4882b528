//! CLI migrate subcommand.
//!
//! Runs the rename propagation pipeline:
//! diff -> path changes -> platform identifiers -> file set -> rewrite.
//!
//! Path changes are breaking by definition, so there is no release gate
//! here; `bump` is where breaking changes are blocked.

use std::path::Path;
use std::process;

use serde_json::json;
use tokensync_engine::{
    apply, build_replacements, diff_baselines, ApplyOptions, FileSet, PlatformConfig,
};

use super::{emit, load_baseline, runtime};
use crate::{report_error, OutputFormat};

pub(crate) struct MigrateOptions<'a> {
    pub old: &'a Path,
    pub new: &'a Path,
    pub root: &'a Path,
    pub platform: PlatformConfig,
    pub dry_run: bool,
    pub output: OutputFormat,
    pub quiet: bool,
}

/// Exits 1 when any file could not be rewritten.
pub(crate) fn cmd_migrate(opts: MigrateOptions<'_>) {
    let MigrateOptions {
        old,
        new,
        root,
        platform,
        dry_run,
        output,
        quiet,
    } = opts;

    // 1. Path changes between the baselines
    let old = load_baseline(old, output, quiet);
    let new = load_baseline(new, output, quiet);
    let changes = diff_baselines(&old, &new);

    // 2. Platform renames
    let mappings = build_replacements(&changes.path_changes, &platform);
    if mappings.is_empty() {
        emit(
            json!({ "platform": platform.name, "mappings": [], "report": null }),
            format!("no renames for platform '{}'", platform.name),
            output,
            quiet,
        );
        return;
    }

    // 3. Files to rewrite
    let files = match FileSet::collect(root, &platform.include, &platform.exclude) {
        Ok(f) => f,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    tracing::info!(
        "{} rename(s) over {} file(s) under {}",
        mappings.len(),
        files.len(),
        root.display()
    );

    // 4. Rewrite
    let rt = runtime(output, quiet);
    let options = ApplyOptions { dry_run };
    let report = rt.block_on(apply(&mappings, &platform, files.files(), options));

    let mut text: Vec<String> = mappings
        .iter()
        .map(|m| format!("{} -> {}", m.from, m.to))
        .collect();
    text.push(String::new());
    text.push(report.to_text());
    emit(
        json!({
            "platform": platform.name,
            "mappings": mappings,
            "report": report.to_json(),
        }),
        text.join("\n"),
        output,
        quiet,
    );

    if !report.errors.is_empty() {
        process::exit(1);
    }
}
