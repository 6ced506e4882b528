//! Conformance test suite for `HostGraph` implementations.
//!
//! Backend-agnostic checks that any host bridge can run to verify it
//! behaves the way the reconciler expects:
//!
//! - **Collections**: creation with exactly one default mode, mode add/rename
//! - **Variables**: creation, rename, per-mode values, kind checking, aliases
//! - **Identity**: origin metadata and the recorded source identity
//!
//! # Usage
//!
//! ```ignore
//! use tokensync_host::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn bridge_conformance() {
//!     let report = run_conformance_suite(|| async { connect_test_bridge().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod collection;
mod identity;
mod variable;

use std::fmt;
use std::future::Future;

use crate::HostGraph;

/// Result of a single conformance check.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Check category (e.g. "collection", "variable").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Failure message if the check failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a host graph.
///
/// `factory` is called once per check to create a fresh, empty graph.
pub async fn run_conformance_suite<G, F, Fut>(factory: F) -> ConformanceReport
where
    G: HostGraph,
    F: Fn() -> Fut,
    Fut: Future<Output = G>,
{
    let mut results = Vec::new();

    results.extend(collection::run_collection_tests(&factory).await);
    results.extend(variable::run_variable_tests(&factory).await);
    results.extend(identity::run_identity_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

/// Turn a host error into a check failure message.
fn host_err(e: crate::HostError) -> String {
    e.to_string()
}
