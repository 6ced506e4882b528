//! Baseline reconciliation engine.
//!
//! - [`diff`]: compare two baseline snapshots into a categorized [`ChangeSet`].
//! - [`classify`]: derive a semantic version bump from a change set.
//! - [`reconcile`]: import a snapshot into a live [`HostGraph`](tokensync_host::HostGraph),
//!   matching by recorded identity before display name.
//! - [`alias`]: deferred resolution of `{a.b.c}` references between variables.
//! - [`propagate`]: turn breaking path changes into renames across source trees.
//! - [`pipeline`]: the release gate tying diff and classification together.
//!
//! Diffing and classification are pure and synchronous. Reconciliation and
//! propagation are async; the engine never reads ambient configuration.

pub mod alias;
pub mod classify;
pub mod diff;
mod error;
pub mod pipeline;
pub mod propagate;
pub mod reconcile;
pub mod version;

pub use alias::{AliasError, AliasResolution, AliasResolver, Qualifiers, ResolverState};
pub use classify::{classify, ChangeKind, ChangeType, TokenChange, VersionBump};
pub use diff::{diff_baselines, ChangeSet, PathChange, ValueChange, VariableRef};
pub use error::EngineError;
pub use pipeline::{plan_release, ReleasePlan};
pub use propagate::{
    apply, build_replacements, scan, ApplyOptions, ApplyReport, FileSet, PlatformConfig,
    RenameMapping,
};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileResult, ReconcileWarning};
pub use version::{Version, VersionError};
