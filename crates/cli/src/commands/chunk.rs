//! CLI chunk/join subcommands.
//!
//! Storage is a directory holding one file per key, standing in for the
//! host's key/value store.

use std::path::Path;
use std::process;

use serde_json::json;
use tokensync_interchange::{split_chunks, ChunkConfig, ChunkedPayload};

use super::emit;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_chunk(
    file: &Path,
    out_dir: &Path,
    config: &ChunkConfig,
    output: OutputFormat,
    quiet: bool,
) {
    let payload = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    // Rejoined chunks are parsed as JSON, so refuse to store anything else.
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&payload) {
        let msg = format!("error parsing JSON in '{}': {}", file.display(), e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        let msg = format!("error creating '{}': {}", out_dir.display(), e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    let chunked = split_chunks(&payload, config.chunk_size);
    let entries = chunked.storage_entries(config);
    for (key, value) in &entries {
        let path = out_dir.join(key);
        if let Err(e) = std::fs::write(&path, value) {
            let msg = format!("error writing '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
    tracing::info!(
        "Stored {} chunk(s) of at most {} characters",
        chunked.chunk_count(),
        config.chunk_size
    );

    let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    emit(
        json!({ "chunk_count": chunked.chunk_count(), "keys": keys }),
        format!(
            "Wrote {} chunk(s) to {} (count under '{}')",
            chunked.chunk_count(),
            out_dir.display(),
            config.count_key()
        ),
        output,
        quiet,
    );
}

/// Prints the reassembled payload verbatim, in either output format.
pub(crate) fn cmd_join(dir: &Path, config: &ChunkConfig, output: OutputFormat, quiet: bool) {
    let chunked =
        match ChunkedPayload::from_storage(config, |key| std::fs::read_to_string(dir.join(key)).ok())
        {
            Ok(c) => c,
            Err(e) => {
                report_error(&format!("error in '{}': {}", dir.display(), e), output, quiet);
                process::exit(1);
            }
        };

    let payload = chunked.join();
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&payload) {
        let msg = format!("reassembled payload is not JSON: {}", e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }
    tracing::info!("Joined {} chunk(s)", chunked.chunk_count());
    if !quiet {
        println!("{}", payload);
    }
}
