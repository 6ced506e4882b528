//! End-to-end engine tests over serialized baselines.
//!
//! 1. Baselines in either wire shape compare structurally
//! 2. A path move blocks the release, and when forced feeds the propagator
//! 3. Dotted renames stop at path boundaries
//! 4. Importing the same baseline twice creates nothing the second time
//! 5. Re-importing another file's baseline touches only that file's collections
//! 6. A host failure aborts reconciliation with a host error

use async_trait::async_trait;
use serde_json::json;

use tokensync_engine::propagate::FileSet;
use tokensync_engine::{
    apply, build_replacements, diff_baselines, plan_release, reconcile, ApplyOptions, ChangeType,
    EngineError, PlatformConfig, ReconcileOptions, Version,
};
use tokensync_host::{
    HostCollection, HostError, HostGraph, HostMode, HostValue, HostVariable, MemoryGraph,
    ValueKind,
};
use tokensync_interchange::{parse_baseline, BaselineSnapshot};

// ──────────────────────────────────────────────
// Fixtures
// ──────────────────────────────────────────────

fn v1() -> BaselineSnapshot {
    parse_baseline(&json!({
        "metadata": { "version": "1.0.0", "exportedAt": "2026-01-01T00:00:00Z", "sourceIdentity": "file-1" },
        "entries": {
            "colors:light:V1": { "path": "colors.light.primary", "value": "#ffffff", "type": "color", "collection": "colors", "mode": "light" },
            "colors:dark:V1": { "path": "colors.dark.primary", "value": "#000000", "type": "color", "collection": "colors", "mode": "dark" },
            "colors:light:V2": { "path": "colors.light.surface", "value": "{colors.light.primary}", "type": "color", "collection": "colors", "mode": "light" },
            "colors:dark:V2": { "path": "colors.dark.surface", "value": "{colors.dark.primary}", "type": "color", "collection": "colors", "mode": "dark" },
            "spacing:default:V3": { "path": "spacing.default.sm", "value": "8px", "type": "dimension", "collection": "spacing", "mode": "default" }
        }
    }))
    .unwrap()
}

/// `v1` in the `$value`/`$type` shape with `primary` moved under `brand`.
fn v2_moved() -> BaselineSnapshot {
    parse_baseline(&json!({
        "metadata": { "version": "1.0.0", "fileKey": "file-1" },
        "entries": {
            "colors:light:V1": { "path": "colors.light.brand.primary", "$value": "#ffffff", "$type": "color" },
            "colors:dark:V1": { "path": "colors.dark.brand.primary", "$value": "#000000", "$type": "color" },
            "colors:light:V2": { "path": "colors.light.surface", "$value": "{colors.light.brand.primary}", "$type": "color" },
            "colors:dark:V2": { "path": "colors.dark.surface", "$value": "{colors.dark.brand.primary}", "$type": "color" },
            "spacing:default:V3": { "path": "spacing.default.sm", "$value": "8px", "$type": "dimension" }
        }
    }))
    .unwrap()
}

// ──────────────────────────────────────────────
// Diff and release
// ──────────────────────────────────────────────

#[test]
fn wire_shapes_normalize_to_the_same_entries() {
    let dollar = parse_baseline(&json!({
        "metadata": { "version": "1.0.0", "fileIdentity": "file-1" },
        "entries": {
            "colors:light:V1": { "path": "colors.light.primary", "$value": "#FFFFFF", "$type": "color" },
            "colors:dark:V1": { "path": "colors.dark.primary", "$value": "#000", "$type": "color" },
            "colors:light:V2": { "path": "colors.light.surface", "$value": "{colors.light.primary}", "$type": "color" },
            "colors:dark:V2": { "path": "colors.dark.surface", "$value": "{colors.dark.primary}", "$type": "color" },
            "spacing:default:V3": { "path": "spacing.default.sm", "$value": "8px", "$type": "dimension" }
        }
    }))
    .unwrap();

    let changes = diff_baselines(&v1(), &dollar);
    // `#000` and `#000000` are different spellings, so exactly one value change
    assert_eq!(changes.value_changes.len(), 1);
    assert_eq!(changes.breaking_count(), 0);
    assert_eq!(dollar.metadata.source_identity.as_deref(), Some("file-1"));
}

#[test]
fn path_move_blocks_release_then_drives_renames() {
    let old = v1();
    let new = v2_moved();

    match plan_release(&old, &new, None, false) {
        Err(EngineError::BreakingChangeBlocked { breaking_count }) => {
            assert_eq!(breaking_count, 2)
        }
        other => panic!("expected BreakingChangeBlocked, got {:?}", other),
    }

    let plan = plan_release(&old, &new, None, true).unwrap();
    assert_eq!(plan.bump.change_type, ChangeType::Major);
    assert_eq!(plan.bump.suggested, Version::new(2, 0, 0));
    // alias text changed too, but a moved path is never also a value change
    assert!(plan
        .changes
        .value_changes
        .iter()
        .all(|c| c.variable_id.as_str() != "V1"));

    // `brand` is a structural qualifier for the built-in CSS platform
    let css = PlatformConfig::css();
    assert!(build_replacements(&plan.changes.path_changes, &css).is_empty());

    let branded = PlatformConfig {
        strip_segments: vec!["light".to_string(), "dark".to_string()],
        ..css
    };
    let mappings = build_replacements(&plan.changes.path_changes, &branded);
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].from, "--colors-primary");
    assert_eq!(mappings[0].to, "--colors-brand-primary");
}

#[tokio::test]
async fn renames_propagate_into_source_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/lib")).unwrap();
    std::fs::write(
        root.join("src/app.css"),
        ".btn { background: var(--spacing-sm); padding: var(--spacing-sm-x); }",
    )
    .unwrap();
    std::fs::write(root.join("node_modules/lib/x.css"), "var(--spacing-sm)").unwrap();

    let old = v1();
    let mut new = v1();
    for entry in new.entries.values_mut() {
        if entry.path == "spacing.default.sm" {
            entry.path = "spacing.default.small".to_string();
        }
    }

    let changes = diff_baselines(&old, &new);
    assert_eq!(changes.path_changes.len(), 1);

    let css = PlatformConfig::css();
    let mappings = build_replacements(&changes.path_changes, &css);
    let files = FileSet::collect(root, &css.include, &css.exclude).unwrap();
    assert_eq!(files.len(), 1);

    let report = apply(&mappings, &css, files.files(), ApplyOptions::default()).await;
    assert_eq!(report.total_replacements, 1);
    assert_eq!(
        std::fs::read_to_string(root.join("src/app.css")).unwrap(),
        ".btn { background: var(--spacing-small); padding: var(--spacing-sm-x); }"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("node_modules/lib/x.css")).unwrap(),
        "var(--spacing-sm)"
    );
}

#[tokio::test]
async fn dotted_renames_leave_longer_paths_alone() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(
        root.join("theme.ts"),
        "gap(tokens.spacing.sm); gap(spacing.sm.half); gap(spacing.sm);",
    )
    .unwrap();

    let old = v1();
    let mut new = v1();
    for entry in new.entries.values_mut() {
        if entry.path == "spacing.default.sm" {
            entry.path = "spacing.default.small".to_string();
        }
    }
    let changes = diff_baselines(&old, &new);

    let js = PlatformConfig::js();
    let mappings = build_replacements(&changes.path_changes, &js);
    assert_eq!(mappings[0].from, "spacing.sm");
    let files = FileSet::collect(root, &js.include, &js.exclude).unwrap();

    let report = apply(&mappings, &js, files.files(), ApplyOptions::default()).await;
    assert_eq!(report.total_replacements, 1);
    assert_eq!(
        std::fs::read_to_string(root.join("theme.ts")).unwrap(),
        "gap(tokens.spacing.sm); gap(spacing.sm.half); gap(spacing.small);"
    );
}

// ──────────────────────────────────────────────
// Reconciliation
// ──────────────────────────────────────────────

#[tokio::test]
async fn repeated_import_is_idempotent() {
    let graph = MemoryGraph::new();
    let first = reconcile(&graph, &v1(), ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(first.variables_created, 3);
    assert_eq!(first.aliases_resolved, 2);

    let second = reconcile(&graph, &v1(), ReconcileOptions::default())
        .await
        .unwrap();
    assert!(second.created_nothing(), "{}", second.to_text());

    // a moved path renames in place rather than creating a new variable
    let third = reconcile(&graph, &v2_moved(), ReconcileOptions::default())
        .await
        .unwrap();
    assert!(third.created_nothing(), "{}", third.to_text());
    let vars = graph.list_variables().await.unwrap();
    assert_eq!(vars.len(), 3);
    assert!(vars.iter().any(|v| v.name == "brand/primary"));
    assert_eq!(third.aliases_resolved, 2);
}

/// A host whose variable creation always fails.
struct BrokenHost {
    inner: MemoryGraph,
}

#[async_trait]
impl HostGraph for BrokenHost {
    async fn list_collections(&self) -> Result<Vec<HostCollection>, HostError> {
        self.inner.list_collections().await
    }
    async fn list_variables(&self) -> Result<Vec<HostVariable>, HostError> {
        self.inner.list_variables().await
    }
    async fn source_identity(&self) -> Result<Option<String>, HostError> {
        self.inner.source_identity().await
    }
    async fn create_collection(&self, name: &str) -> Result<HostCollection, HostError> {
        self.inner.create_collection(name).await
    }
    async fn add_mode(&self, collection_id: &str, name: &str) -> Result<HostMode, HostError> {
        self.inner.add_mode(collection_id, name).await
    }
    async fn rename_mode(
        &self,
        collection_id: &str,
        mode_id: &str,
        name: &str,
    ) -> Result<(), HostError> {
        self.inner.rename_mode(collection_id, mode_id, name).await
    }
    async fn create_variable(
        &self,
        _name: &str,
        _collection_id: &str,
        _kind: ValueKind,
    ) -> Result<HostVariable, HostError> {
        Err(HostError::Backend("quota exceeded".to_string()))
    }
    async fn rename_variable(&self, variable_id: &str, name: &str) -> Result<(), HostError> {
        self.inner.rename_variable(variable_id, name).await
    }
    async fn set_value_for_mode(
        &self,
        variable_id: &str,
        mode_id: &str,
        value: HostValue,
    ) -> Result<(), HostError> {
        self.inner.set_value_for_mode(variable_id, mode_id, value).await
    }
    async fn set_collection_origin(
        &self,
        collection_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        self.inner.set_collection_origin(collection_id, original_id).await
    }
    async fn set_mode_origin(
        &self,
        collection_id: &str,
        mode_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        self.inner
            .set_mode_origin(collection_id, mode_id, original_id)
            .await
    }
    async fn set_variable_origin(
        &self,
        variable_id: &str,
        original_id: &str,
    ) -> Result<(), HostError> {
        self.inner.set_variable_origin(variable_id, original_id).await
    }
    async fn set_source_identity(&self, identity: &str) -> Result<(), HostError> {
        self.inner.set_source_identity(identity).await
    }
}

#[tokio::test]
async fn host_failure_aborts_the_pass() {
    let host = BrokenHost {
        inner: MemoryGraph::new(),
    };
    let err = reconcile(&host, &v1(), ReconcileOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Host(HostError::Backend(_))));
    // the source identity is only recorded once a pass completes
    assert_eq!(host.source_identity().await.unwrap(), None);
}
