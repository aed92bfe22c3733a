//! Tests for the `wb` binary

use std::io::Write;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::{NamedTempFile, TempDir};

/// Build a `wb` command isolated from any local `.widgetboot.yml`
fn wb(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("wb");
    cmd.timeout(Duration::from_secs(15));
    cmd.current_dir(dir.path());
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.env("NO_COLOR", "1");
    cmd
}

fn bootstrap_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(source.as_bytes()).expect("write bootstrap");
    file
}

#[test]
fn test_run_without_configuration_succeeds() {
    let dir = TempDir::new().unwrap();
    wb(&dir)
        .args(["run", "--attr", "data-lang=fr"])
        .assert()
        .success()
        .stdout(contains("done"));
}

#[test]
fn test_run_without_host_fails() {
    let dir = TempDir::new().unwrap();
    wb(&dir)
        .args(["run", "--no-host"])
        .assert()
        .failure()
        .stdout(contains("failed"))
        .stderr(contains("Configuration not found"));
}

#[test]
fn test_run_rejects_malformed_attribute() {
    let dir = TempDir::new().unwrap();
    wb(&dir)
        .args(["run", "--attr", "novalue"])
        .assert()
        .failure()
        .stderr(contains("NAME=VALUE"));
}

#[test]
fn test_check_bootstrap_lists_steps() {
    let dir = TempDir::new().unwrap();
    let file = bootstrap_file("script {resources}/app.js\nmount app id=root\nresolve\n");

    wb(&dir)
        .arg("check-bootstrap")
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("3 step(s)").and(contains("settles")));
}

#[test]
fn test_check_bootstrap_reports_compile_error() {
    let dir = TempDir::new().unwrap();
    let file = bootstrap_file("script {resources}/app.js\nlaunch rockets\n");

    wb(&dir)
        .arg("check-bootstrap")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(contains("line 2").and(contains("launch")));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("wb.yml");
    std::fs::write(&config, "fetch:\n  timeout-ms: 0\n").unwrap();

    wb(&dir)
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(contains("timeout-ms"));
}
