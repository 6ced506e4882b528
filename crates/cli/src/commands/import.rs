//! CLI import subcommand.
//!
//! Loads a graph state file (or starts empty), reconciles a baseline into
//! it, and writes the state back only when the pass succeeds.

use std::path::Path;
use std::process;

use tokensync_engine::{reconcile, ReconcileOptions};
use tokensync_host::MemoryGraph;

use super::{emit, load_baseline, runtime};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_import(
    baseline_path: &Path,
    graph_path: &Path,
    no_match: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let snapshot = load_baseline(baseline_path, output, quiet);
    let graph = load_graph(graph_path, output, quiet);

    let options = ReconcileOptions {
        match_existing: !no_match,
    };
    let rt = runtime(output, quiet);
    let result = match rt.block_on(reconcile(&graph, &snapshot, options)) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("import failed: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let state = match graph.to_json() {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(graph_path, state) {
        let msg = format!("error writing '{}': {}", graph_path.display(), e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    emit(result.to_json(), result.to_text(), output, quiet);
}

fn load_graph(path: &Path, output: OutputFormat, quiet: bool) -> MemoryGraph {
    if !path.exists() {
        tracing::info!("{} does not exist, starting from an empty graph", path.display());
        return MemoryGraph::new();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match MemoryGraph::from_json(&text) {
        Ok(g) => g,
        Err(e) => {
            let msg = format!("error loading graph '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
