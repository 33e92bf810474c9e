//! CLI integration tests
//!
//! Every command runs in a scratch directory with its own HOME so no real
//! configuration leaks in. No renderer artifact exists there, which keeps
//! these tests independent of a native build.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const GOTMPL_VARS: &[&str] = &[
    "GOTMPL_LIBRARY_DIR",
    "GOTMPL_LIBRARY_PATH",
    "GOTMPL_MAX_INFLIGHT",
    "GOTMPL_SERIALIZE_CALLS",
    "GOTMPL_STRICT_SENTINELS",
    "GOTMPL_JSON",
    "GOTMPL_LOG",
];

fn gotmpl_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gotmpl").unwrap();
    cmd.current_dir(workdir.path()).env("HOME", workdir.path());
    for var in GOTMPL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn workdir_with_template() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hello.tmpl"), "Hello, {{.Name}}!").unwrap();
    fs::create_dir(dir.path().join("empty-lib")).unwrap();
    dir
}

// ══════════════════════════════════════════════════════════════════════════════
// HELP
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    gotmpl_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("GOTMPL_LIBRARY_DIR"));
}

#[test]
fn test_lib_and_lib_dir_conflict() {
    let dir = workdir_with_template();
    gotmpl_cmd(&dir)
        .args(["render", "hello.tmpl", "--lib", "x.so", "--lib-dir", "empty-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ══════════════════════════════════════════════════════════════════════════════
// RENDER
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_render_without_library_reports_path_and_hint() {
    let dir = workdir_with_template();
    gotmpl_cmd(&dir)
        .args(["render", "hello.tmpl", "--set", "Name=World", "--lib-dir", "empty-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LibraryNotFound"))
        .stderr(predicate::str::contains("Shared library not found at:"))
        .stderr(predicate::str::contains("empty-lib"))
        .stderr(predicate::str::contains("Try reinstalling"));
}

#[test]
fn test_render_library_dir_from_environment() {
    let dir = workdir_with_template();
    let lib_dir = dir.path().join("empty-lib");
    gotmpl_cmd(&dir)
        .env("GOTMPL_LIBRARY_DIR", &lib_dir)
        .args(["render", "hello.tmpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(lib_dir.display().to_string()));
}

#[test]
fn test_render_missing_template_file() {
    let dir = workdir_with_template();
    gotmpl_cmd(&dir)
        .args(["render", "absent.tmpl", "--lib-dir", "empty-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read template file"));
}

#[test]
fn test_render_rejects_malformed_set() {
    let dir = workdir_with_template();
    gotmpl_cmd(&dir)
        .args(["render", "hello.tmpl", "--set", "Name", "--lib-dir", "empty-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected KEY=VALUE"));
}

#[test]
fn test_render_rejects_invalid_stdin_data() {
    let dir = workdir_with_template();
    let mut cmd = gotmpl_cmd(&dir);
    cmd.args(["render", "hello.tmpl", "--data", "-", "--lib-dir", "empty-lib"]);
    assert_cmd::Command::from_std(cmd)
        .write_stdin("{broken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data on stdin is not valid JSON"));
}

// ══════════════════════════════════════════════════════════════════════════════
// CHECK
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_check_reports_missing_artifact() {
    let dir = workdir_with_template();
    gotmpl_cmd(&dir)
        .args(["check", "--lib-dir", "empty-lib"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("library:"))
        .stdout(predicate::str::contains("exists:  no"))
        .stdout(predicate::str::contains("loads:   no"));
}

#[test]
fn test_check_json_report() {
    let dir = workdir_with_template();
    let output = gotmpl_cmd(&dir)
        .args(["check", "--json", "--lib", "nowhere/librenderer.so"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["path"]
        .as_str()
        .unwrap()
        .ends_with("nowhere/librenderer.so"));
    assert_eq!(report["exists"], false);
    assert_eq!(report["loaded"], false);
}

#[test]
fn test_check_garbage_artifact_fails_to_load() {
    let dir = workdir_with_template();
    fs::write(dir.path().join("garbage.so"), b"not a shared object").unwrap();
    gotmpl_cmd(&dir)
        .args(["check", "--lib", "garbage.so"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("exists:  yes"))
        .stdout(predicate::str::contains("Failed to load shared library"));
}

// ══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_defaults() {
    let dir = TempDir::new().unwrap();
    gotmpl_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_inflight = 8"))
        .stdout(predicate::str::contains("serialize_calls = false"))
        .stdout(predicate::str::contains("strict_sentinels = true"))
        .stdout(predicate::str::contains("# artifact:"));
}

#[test]
fn test_config_reads_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("gotmpl.toml"),
        "[runtime]\nmax_inflight = 3\nserialize_calls = true\n",
    )
    .unwrap();

    gotmpl_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_inflight = 3"))
        .stdout(predicate::str::contains("serialize_calls = true"));
}

#[test]
fn test_config_environment_beats_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gotmpl.toml"), "[runtime]\nmax_inflight = 3\n").unwrap();

    gotmpl_cmd(&dir)
        .env("GOTMPL_MAX_INFLIGHT", "5")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_inflight = 5"));
}

#[test]
fn test_config_flag_beats_environment() {
    let dir = TempDir::new().unwrap();
    gotmpl_cmd(&dir)
        .env("GOTMPL_LIBRARY_PATH", "/from/env/librenderer.so")
        .args(["config", "--lib", "/from/flag/librenderer.so"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# artifact: /from/flag/librenderer.so"));
}

#[test]
fn test_config_invalid_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gotmpl.toml"), "[runtime]\nmax_inflight = 0\n").unwrap();

    gotmpl_cmd(&dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load gotmpl configuration"));
}
