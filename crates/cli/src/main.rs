mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Design token baseline toolchain.
#[derive(Parser)]
#[command(name = "tokensync", version, about = "Design token baseline toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to a tokensync.toml (defaults to ./tokensync.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two baseline snapshots
    Diff {
        /// The previous baseline JSON
        old: PathBuf,
        /// The incoming baseline JSON
        new: PathBuf,
    },

    /// Suggest the next semantic version and gate breaking changes
    Bump {
        /// The previous baseline JSON
        old: PathBuf,
        /// The incoming baseline JSON
        new: PathBuf,
        /// Current version (defaults to the old baseline's recorded version)
        #[arg(long)]
        current: Option<String>,
        /// Release even when breaking changes are found
        #[arg(long)]
        force: bool,
    },

    /// Import a baseline into a JSON-persisted graph
    Import {
        /// The baseline JSON to import
        baseline: PathBuf,
        /// Graph state file; created when missing
        #[arg(long)]
        graph: PathBuf,
        /// Create every entity instead of matching existing ones
        #[arg(long)]
        no_match: bool,
    },

    /// Rewrite renamed token identifiers across a source tree
    Migrate {
        /// The previous baseline JSON
        old: PathBuf,
        /// The incoming baseline JSON
        new: PathBuf,
        /// Root of the source tree to rewrite
        #[arg(long)]
        root: PathBuf,
        /// Target platform (css, scss, js, or one from the config)
        #[arg(long, default_value = "css")]
        platform: String,
        /// Report replacements without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Split a baseline payload into storage chunks
    Chunk {
        /// The payload to split
        file: PathBuf,
        /// Directory receiving one file per storage key
        #[arg(long)]
        out: PathBuf,
        /// Storage key prefix (overrides the config)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Reassemble a chunked payload and print it
    Join {
        /// Directory holding the storage key files
        dir: PathBuf,
        /// Storage key prefix (overrides the config)
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Diff { old, new } => {
            commands::diff::cmd_diff(&old, &new, cli.output, cli.quiet);
        }
        Commands::Bump {
            old,
            new,
            current,
            force,
        } => {
            commands::bump::cmd_bump(
                &old,
                &new,
                current.as_deref(),
                force,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Import {
            baseline,
            graph,
            no_match,
        } => {
            commands::import::cmd_import(&baseline, &graph, no_match, cli.output, cli.quiet);
        }
        Commands::Migrate {
            old,
            new,
            root,
            platform,
            dry_run,
        } => {
            let Some(platform) = config.platform(&platform) else {
                let msg = format!("unknown platform '{}'", platform);
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            };
            commands::migrate::cmd_migrate(commands::migrate::MigrateOptions {
                old: &old,
                new: &new,
                root: &root,
                platform,
                dry_run,
                output: cli.output,
                quiet: cli.quiet,
            });
        }
        Commands::Chunk { file, out, prefix } => {
            let chunking = config.chunk_config(prefix.as_deref());
            commands::chunk::cmd_chunk(&file, &out, &chunking, cli.output, cli.quiet);
        }
        Commands::Join { dir, prefix } => {
            let chunking = config.chunk_config(prefix.as_deref());
            commands::chunk::cmd_join(&dir, &chunking, cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
