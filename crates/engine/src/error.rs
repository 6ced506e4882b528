use tokensync_host::HostError;
use tokensync_interchange::InterchangeError;

use crate::alias::AliasError;
use crate::version::VersionError;

/// Hard errors that abort a pipeline step.
///
/// Non-fatal conditions (identity mismatch, coercion fallbacks, unresolved
/// aliases, per-file write failures) are collected into result structs
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A snapshot is missing required fields; nothing was mutated.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] InterchangeError),

    /// The release gate found breaking changes and `force` was not set.
    #[error("{breaking_count} breaking change(s) found; rerun with force to release anyway")]
    BreakingChangeBlocked { breaking_count: usize },

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("alias resolver: {0}")]
    Alias(#[from] AliasError),

    #[error(transparent)]
    Version(#[from] VersionError),
}
