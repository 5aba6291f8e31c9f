//! Smoke tests for the proctor binary.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_version_json() {
    let env = TestEnv::new();

    env.proctor()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            r#""version":"{}""#,
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains(r#""commit":"#));
}

#[test]
fn test_version_human() {
    let env = TestEnv::new();

    env.proctor()
        .args(["-H", "version"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("proctor "));
}

#[test]
fn test_help() {
    let env = TestEnv::new();

    env.proctor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("suite"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn test_unknown_command_is_rejected() {
    let env = TestEnv::new();

    env.proctor().arg("frobnicate").assert().failure();
}

#[test]
fn test_commands_write_log_file() {
    let env = TestEnv::new();

    env.proctor().arg("list").assert().success();

    let log = std::fs::read_to_string(env.data_dir.path().join("proctor.log")).unwrap();
    assert!(log.contains("proctor started"));
}

#[test]
fn test_stdout_setting_mirrors_log_to_stderr() {
    let env = TestEnv::new();

    env.proctor()
        .args(["list", "--stdout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("proctor started"));
}
