//! CLI integration tests for every subcommand.
//!
//! Uses `assert_cmd` to spawn the `tokensync` binary and verify exit
//! codes, stdout content, and stderr content.
//!
//! Every test runs inside its own temp directory so that no stray
//! `tokensync.toml` is picked up from the working directory.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper: create a Command for the `tokensync` binary, rooted at `dir`.
fn tokensync(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("tokensync");
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn baseline(version: &str, primary: &str, sm_path: &str) -> Value {
    json!({
        "metadata": { "version": version, "exportedAt": "2026-01-01T00:00:00Z", "sourceIdentity": "file-1" },
        "entries": {
            "colors:light:V1": { "path": "colors.light.primary", "value": primary, "type": "color", "collection": "colors", "mode": "light" },
            "colors:light:V2": { "path": "colors.light.surface", "value": "{colors.light.primary}", "type": "color", "collection": "colors", "mode": "light" },
            "spacing:default:V3": { "path": sm_path, "value": "8px", "type": "dimension", "collection": "spacing", "mode": "default" }
        }
    })
}

/// A temp dir holding `old.json` and `new.json`.
fn pair(old: Value, new: Value) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let old = write_json(dir.path(), "old.json", &old);
    let new = write_json(dir.path(), "new.json", &new);
    (dir, old, new)
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    tokensync(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Design token baseline toolchain"));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    tokensync(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokensync"));
}

// ──────────────────────────────────────────────
// 2. Diff subcommand
// ──────────────────────────────────────────────

#[test]
fn diff_identical_files_exits_0() {
    let b = baseline("1.0.0", "#ffffff", "spacing.default.sm");
    let (dir, old, new) = pair(b.clone(), b);
    tokensync(dir.path())
        .args(["diff"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("no differences"));
}

#[test]
fn diff_value_change_exits_1_with_json() {
    let (dir, old, new) = pair(
        baseline("1.0.0", "#ffffff", "spacing.default.sm"),
        baseline("1.0.0", "#f5f5f5", "spacing.default.sm"),
    );
    let out = tokensync(dir.path())
        .args(["--output", "json", "diff"])
        .arg(&old)
        .arg(&new)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    let doc = stdout_json(&out);
    assert_eq!(doc["value_changes"].as_array().unwrap().len(), 1);
    assert!(doc["path_changes"].as_array().unwrap().is_empty());
}

#[test]
fn diff_malformed_baseline_exits_1() {
    let (dir, old, _) = pair(
        baseline("1.0.0", "#ffffff", "spacing.default.sm"),
        json!({}),
    );
    let bad = write_json(dir.path(), "bad.json", &json!({ "entries": {} }));
    tokensync(dir.path())
        .arg("diff")
        .arg(&old)
        .arg(&bad)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("metadata"));
}

#[test]
fn diff_nonexistent_file_exits_1() {
    let dir = TempDir::new().unwrap();
    tokensync(dir.path())
        .args(["diff", "missing_a.json", "missing_b.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading"));
}

// ──────────────────────────────────────────────
// 3. Bump subcommand
// ──────────────────────────────────────────────

#[test]
fn bump_value_change_suggests_patch() {
    let (dir, old, new) = pair(
        baseline("1.2.0", "#ffffff", "spacing.default.sm"),
        baseline("1.2.0", "#f5f5f5", "spacing.default.sm"),
    );
    tokensync(dir.path())
        .arg("bump")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.0 -> 1.2.1 (patch)"));
}

#[test]
fn bump_breaking_change_is_blocked() {
    let (dir, old, new) = pair(
        baseline("1.2.0", "#ffffff", "spacing.default.sm"),
        baseline("1.2.0", "#ffffff", "spacing.default.small"),
    );
    tokensync(dir.path())
        .arg("bump")
        .arg(&old)
        .arg(&new)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("release blocked"));
}

#[test]
fn bump_forced_breaking_change_is_major() {
    let (dir, old, new) = pair(
        baseline("1.2.0", "#ffffff", "spacing.default.sm"),
        baseline("1.2.0", "#ffffff", "spacing.default.small"),
    );
    let out = tokensync(dir.path())
        .args(["--output", "json", "bump", "--force"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .get_output()
        .clone();
    let doc = stdout_json(&out);
    assert_eq!(doc["bump"]["suggested"], "2.0.0");
    assert_eq!(doc["bump"]["change_type"], "major");
}

#[test]
fn bump_explicit_current_overrides_recorded_version() {
    let (dir, old, new) = pair(
        baseline("1.2.0", "#ffffff", "spacing.default.sm"),
        baseline("1.2.0", "#f5f5f5", "spacing.default.sm"),
    );
    tokensync(dir.path())
        .args(["bump", "--current", "v3.0.0"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("3.0.0 -> 3.0.1"));
}

#[test]
fn bump_invalid_current_exits_1() {
    let b = baseline("1.0.0", "#ffffff", "spacing.default.sm");
    let (dir, old, new) = pair(b.clone(), b);
    tokensync(dir.path())
        .args(["bump", "--current", "one.two"])
        .arg(&old)
        .arg(&new)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid version"));
}

// ──────────────────────────────────────────────
// 4. Import subcommand
// ──────────────────────────────────────────────

#[test]
fn import_creates_graph_then_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let b = write_json(
        dir.path(),
        "baseline.json",
        &baseline("1.0.0", "#ffffff", "spacing.default.sm"),
    );
    let graph = dir.path().join("graph.json");

    let first = tokensync(dir.path())
        .args(["--output", "json", "import"])
        .arg(&b)
        .arg("--graph")
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    let first = stdout_json(&first);
    assert_eq!(first["collections_created"], 2);
    assert_eq!(first["variables_created"], 3);
    assert_eq!(first["aliases_resolved"], 1);
    assert!(graph.is_file());

    let second = tokensync(dir.path())
        .args(["--output", "json", "import"])
        .arg(&b)
        .arg("--graph")
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    let second = stdout_json(&second);
    assert_eq!(second["collections_created"], 0);
    assert_eq!(second["variables_created"], 0);
}

#[test]
fn import_no_match_creates_again() {
    let dir = TempDir::new().unwrap();
    let b = write_json(
        dir.path(),
        "baseline.json",
        &baseline("1.0.0", "#ffffff", "spacing.default.sm"),
    );
    let graph = dir.path().join("graph.json");
    tokensync(dir.path())
        .arg("import")
        .arg(&b)
        .arg("--graph")
        .arg(&graph)
        .assert()
        .success();

    let out = tokensync(dir.path())
        .args(["--output", "json", "import", "--no-match"])
        .arg(&b)
        .arg("--graph")
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&out)["variables_created"], 3);
}

#[test]
fn import_corrupt_graph_exits_1_and_keeps_file() {
    let dir = TempDir::new().unwrap();
    let b = write_json(
        dir.path(),
        "baseline.json",
        &baseline("1.0.0", "#ffffff", "spacing.default.sm"),
    );
    let graph = dir.path().join("graph.json");
    fs::write(&graph, "not json").unwrap();
    tokensync(dir.path())
        .arg("import")
        .arg(&b)
        .arg("--graph")
        .arg(&graph)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error loading graph"));
    assert_eq!(fs::read_to_string(&graph).unwrap(), "not json");
}

// ──────────────────────────────────────────────
// 5. Migrate subcommand
// ──────────────────────────────────────────────

fn migrate_fixture() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let (dir, old, new) = pair(
        baseline("1.0.0", "#ffffff", "spacing.default.sm"),
        baseline("1.0.0", "#ffffff", "spacing.default.small"),
    );
    let root = dir.path().join("web");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::write(
        root.join("src/app.css"),
        ".a { margin: var(--spacing-sm); padding: var(--spacing-sm-x); }",
    )
    .unwrap();
    fs::write(root.join("node_modules/pkg/x.css"), "var(--spacing-sm)").unwrap();
    (dir, old, new, root)
}

#[test]
fn migrate_dry_run_writes_nothing() {
    let (dir, old, new, root) = migrate_fixture();
    tokensync(dir.path())
        .args(["migrate", "--dry-run"])
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("--spacing-sm -> --spacing-small"))
        .stdout(predicate::str::contains("Would update 1 file(s), 1 replacement(s)"));
    assert_eq!(
        fs::read_to_string(root.join("src/app.css")).unwrap(),
        ".a { margin: var(--spacing-sm); padding: var(--spacing-sm-x); }"
    );
}

#[test]
fn migrate_rewrites_included_files_only() {
    let (dir, old, new, root) = migrate_fixture();
    let out = tokensync(dir.path())
        .args(["--output", "json", "migrate"])
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(&root)
        .assert()
        .success()
        .get_output()
        .clone();
    let doc = stdout_json(&out);
    assert_eq!(doc["platform"], "css");
    assert_eq!(doc["report"]["total_replacements"], 1);
    assert_eq!(
        fs::read_to_string(root.join("src/app.css")).unwrap(),
        ".a { margin: var(--spacing-small); padding: var(--spacing-sm-x); }"
    );
    assert_eq!(
        fs::read_to_string(root.join("node_modules/pkg/x.css")).unwrap(),
        "var(--spacing-sm)"
    );
}

#[test]
fn migrate_uses_configured_platform() {
    let (dir, old, new, root) = migrate_fixture();
    fs::write(root.join("src/theme.html"), "<div style=\"gap: var(--ds-spacing-sm)\">").unwrap();
    fs::write(
        dir.path().join("tokensync.toml"),
        "[migration.platforms.html]\nprefix = \"--ds-\"\ninclude = [\"**/*.html\"]\n",
    )
    .unwrap();
    tokensync(dir.path())
        .args(["migrate", "--platform", "html"])
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(&root)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(root.join("src/theme.html")).unwrap(),
        "<div style=\"gap: var(--ds-spacing-small)\">"
    );
    // css files are outside the configured include set
    assert!(fs::read_to_string(root.join("src/app.css"))
        .unwrap()
        .contains("var(--spacing-sm)"));
}

#[test]
fn migrate_partial_scss_override_keeps_dollar_prefix() {
    let (dir, old, new, root) = migrate_fixture();
    fs::write(root.join("src/theme.sass"), ".a { gap: $spacing-sm; }").unwrap();
    fs::write(
        dir.path().join("tokensync.toml"),
        "[migration.platforms.scss]\ninclude = [\"**/*.sass\"]\n",
    )
    .unwrap();
    tokensync(dir.path())
        .args(["migrate", "--platform", "scss"])
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(&root)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(root.join("src/theme.sass")).unwrap(),
        ".a { gap: $spacing-small; }"
    );
}

#[test]
fn migrate_unknown_platform_exits_1() {
    let (dir, old, new, root) = migrate_fixture();
    tokensync(dir.path())
        .args(["migrate", "--platform", "swift"])
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(&root)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown platform 'swift'"));
}

#[test]
fn migrate_missing_root_exits_1() {
    let (dir, old, new, _) = migrate_fixture();
    tokensync(dir.path())
        .arg("migrate")
        .arg(&old)
        .arg(&new)
        .arg("--root")
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"));
}

// ──────────────────────────────────────────────
// 6. Chunk and join subcommands
// ──────────────────────────────────────────────

#[test]
fn chunk_then_join_reproduces_payload() {
    let dir = TempDir::new().unwrap();
    let payload = json!({ "blob": "é".repeat(250) });
    let file = write_json(dir.path(), "payload.json", &payload);
    fs::write(
        dir.path().join("tokensync.toml"),
        "[chunking]\nchunk_size = 100\nkey_prefix = \"ds\"\n",
    )
    .unwrap();
    let store = dir.path().join("store");

    tokensync(dir.path())
        .arg("chunk")
        .arg(&file)
        .arg("--out")
        .arg(&store)
        .assert()
        .success();
    assert!(store.join("ds_chunk_0").is_file());
    assert!(store.join("ds_chunk_count").is_file());
    let count: usize = fs::read_to_string(store.join("ds_chunk_count"))
        .unwrap()
        .parse()
        .unwrap();
    assert!(count >= 3);

    let out = tokensync(dir.path())
        .arg("join")
        .arg(&store)
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&out), payload);
}

#[test]
fn join_missing_chunk_exits_1() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("x_chunk_count"), "2").unwrap();
    fs::write(store.join("x_chunk_0"), "{").unwrap();
    tokensync(dir.path())
        .args(["join", "--prefix", "x"])
        .arg(&store)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing chunk 1 of 2"));
}

#[test]
fn join_huge_stored_count_exits_1() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("x_chunk_count"), usize::MAX.to_string()).unwrap();
    tokensync(dir.path())
        .args(["join", "--prefix", "x"])
        .arg(&store)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing chunk 0"));
}

#[test]
fn chunk_rejects_non_json_payload() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("payload.txt");
    fs::write(&file, "plain text").unwrap();
    tokensync(dir.path())
        .arg("chunk")
        .arg(&file)
        .arg("--out")
        .arg(dir.path().join("store"))
        .assert()
        .failure()
        .code(1);
}

// ──────────────────────────────────────────────
// 7. Global flags
// ──────────────────────────────────────────────

#[test]
fn json_errors_are_structured() {
    let dir = TempDir::new().unwrap();
    let out = tokensync(dir.path())
        .args(["--output", "json", "diff", "a.json", "b.json"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let err: Value = serde_json::from_slice(&out.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("a.json"));
}

#[test]
fn quiet_suppresses_output() {
    let dir = TempDir::new().unwrap();
    tokensync(dir.path())
        .args(["--quiet", "diff", "a.json", "b.json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn explicit_missing_config_exits_1() {
    let dir = TempDir::new().unwrap();
    tokensync(dir.path())
        .args(["--config", "nope.toml", "diff", "a.json", "b.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading config"));
}
