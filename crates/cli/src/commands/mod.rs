pub(crate) mod bump;
pub(crate) mod chunk;
pub(crate) mod diff;
pub(crate) mod import;
pub(crate) mod migrate;

use std::path::Path;
use std::process;

use serde_json::Value;
use tokensync_interchange::{from_json_str, BaselineSnapshot};

use crate::{report_error, OutputFormat};

/// Read and ingest a baseline, exiting with status 1 on failure.
pub(crate) fn load_baseline(path: &Path, output: OutputFormat, quiet: bool) -> BaselineSnapshot {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match from_json_str(&text) {
        Ok(snapshot) => {
            tracing::debug!("Loaded {} entries from {}", snapshot.len(), path.display());
            snapshot
        }
        Err(e) => {
            let msg = format!("error in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Print a report in the selected format unless quiet.
pub(crate) fn emit(json: Value, text: String, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => println!("{}", text),
    }
}

/// A runtime for the async engine entry points.
pub(crate) fn runtime(output: OutputFormat, quiet: bool) -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
