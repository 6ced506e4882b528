use std::path::Path;
use std::process;

use tokensync_engine::diff_baselines;

use super::{emit, load_baseline};
use crate::OutputFormat;

/// Exits 1 when the baselines differ, like `diff(1)`.
pub(crate) fn cmd_diff(old_path: &Path, new_path: &Path, output: OutputFormat, quiet: bool) {
    let old = load_baseline(old_path, output, quiet);
    let new = load_baseline(new_path, output, quiet);

    let changes = diff_baselines(&old, &new);
    if changes.is_empty() {
        emit(changes.to_json(), "no differences".to_string(), output, quiet);
        return;
    }

    let text = format!(
        "{}\n\n{} change(s), {} breaking",
        changes.to_text(),
        changes.len(),
        changes.breaking_count()
    );
    emit(changes.to_json(), text, output, quiet);
    process::exit(1);
}
