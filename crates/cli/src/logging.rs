//! Tracing subscriber setup for the `tokensync` binary.
//!
//! Logs go to stderr so `--output json` on stdout stays machine-readable.
//! `RUST_LOG` wins when set; otherwise the level follows `-v`.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity count.
///
/// - quiet: errors only
/// - 0: warnings
/// - 1 (`-v`): info
/// - 2 (`-vv`): debug
/// - 3+ (`-vvv`): trace
pub(crate) fn directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub(crate) fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbosity, quiet)));

    // A second init in the same process is harmless; keep the first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(directive(0, false), "warn");
        assert_eq!(directive(1, false), "info");
        assert_eq!(directive(2, false), "debug");
        assert_eq!(directive(7, false), "trace");
    }

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(directive(3, true), "error");
    }
}
