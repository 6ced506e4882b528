use std::path::Path;
use std::process;

use tokensync_engine::{diff_baselines, plan_release, EngineError};

use super::{emit, load_baseline};
use crate::{report_error, OutputFormat};

/// Exits 1 when the release is blocked or a version cannot be parsed.
pub(crate) fn cmd_bump(
    old_path: &Path,
    new_path: &Path,
    current: Option<&str>,
    force: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let old = load_baseline(old_path, output, quiet);
    let new = load_baseline(new_path, output, quiet);

    match plan_release(&old, &new, current, force) {
        Ok(plan) => emit(plan.to_json(), plan.to_text(), output, quiet),
        Err(e @ EngineError::BreakingChangeBlocked { .. }) => {
            // Show what blocked the release before failing.
            let changes = diff_baselines(&old, &new);
            emit(changes.to_json(), changes.to_text(), output, quiet);
            report_error(&format!("release blocked: {}", e), output, quiet);
            process::exit(1);
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}
