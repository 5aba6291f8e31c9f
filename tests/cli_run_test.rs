//! Integration tests for `proctor run` and `proctor suite`.
//!
//! Test commands are shell snippets, so these only run on unix.

#![cfg(unix)]

mod common;

use common::{SAMPLE_DEFS, TestEnv, stdout_json};
use predicates::prelude::*;
use std::fs;

// === run ===

#[test]
fn test_run_passing_test_records_run() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    env.proctor()
        .args(["run", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""test":"login""#))
        .stdout(predicate::str::contains(r#""passed":true"#));

    let records = env.run_records();
    assert_eq!(records.len(), 1);
    let run_dir = records[0].parent().unwrap();
    assert!(run_dir.starts_with(env.runs_path().join("login")));
    let output = fs::read_to_string(run_dir.join("output.log")).unwrap();
    assert!(output.contains("logging in"));
}

#[test]
fn test_run_failing_test_exits_nonzero() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    env.proctor()
        .args(["-H", "run", "broken"])
        .assert()
        .failure()
        .stdout("FAIL broken\n");

    let records = env.run_records();
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&records[0]).unwrap()).unwrap();
    assert_eq!(record["passed"], false);
    assert_eq!(record["exit_code"], 2);
}

#[test]
fn test_run_unknown_test() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    env.proctor()
        .args(["run", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"{"error":"Not found: test 'nope'"}"#));
}

#[test]
fn test_run_cleanup_on_pass_flag() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    env.proctor()
        .args(["run", "login", "--cleanup-on-pass"])
        .assert()
        .success();
    assert!(env.run_records().is_empty());

    // Failing runs are kept
    env.proctor()
        .args(["run", "broken", "--cleanup-on-pass"])
        .assert()
        .failure();
    assert_eq!(env.run_records().len(), 1);
}

#[test]
fn test_run_cleanup_on_pass_setting_and_override() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);
    env.proctor()
        .args(["settings", "cleanup_on_pass=true"])
        .assert()
        .success();

    env.proctor().args(["run", "login"]).assert().success();
    assert!(env.run_records().is_empty());

    env.proctor()
        .args(["run", "login", "--cleanup-on-pass=false"])
        .assert()
        .success();
    assert_eq!(env.run_records().len(), 1);
}

#[test]
fn test_run_custom_runs_dir() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);
    let runs = env.work_path().join("my-runs");

    env.proctor()
        .args(["run", "logout", "--runs-dir"])
        .arg(&runs)
        .assert()
        .success();

    assert!(runs.join("logout").is_dir());
    assert!(env.run_records().is_empty());
}

#[test]
fn test_run_timeout_fails() {
    let env = TestEnv::new();
    env.write_defs(
        "slow.kdl",
        "test \"slow\" {\n    command \"sleep\" \"10\"\n    timeout 1\n}\n",
    );

    env.proctor().args(["run", "slow"]).assert().failure();

    let records = env.run_records();
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&records[0]).unwrap()).unwrap();
    assert_eq!(record["timed_out"], true);
}

// === suite ===

#[test]
fn test_suite_by_name() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    let output = env.proctor().args(["suite", "auth"]).output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["passed"], true);
    assert_eq!(json["suites"][0]["suite"], "auth");
    assert_eq!(json["suites"][0]["tests"].as_array().unwrap().len(), 2);
    assert_eq!(env.run_records().len(), 2);
}

#[test]
fn test_suite_all_fails_when_a_member_fails() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    env.proctor()
        .args(["-H", "suite"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("PASS auth"))
        .stdout(predicate::str::contains("FAIL everything"))
        .stdout(predicate::str::contains("  FAIL broken"));
}

#[test]
fn test_suite_by_tag() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    let output = env.proctor().args(["suite", "-t", "fast"]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["suites"].as_array().unwrap().len(), 1);
    assert_eq!(json["suites"][0]["suite"], "auth");
}

#[test]
fn test_suite_names_from_stdin() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);

    let output = env
        .proctor()
        .arg("suite")
        .write_stdin("auth\nauth\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["suites"].as_array().unwrap().len(), 1);
}

#[test]
fn test_suite_missing_name_and_member() {
    let env = TestEnv::new();
    env.write_defs("defs.kdl", SAMPLE_DEFS);
    env.write_defs(
        "dangling.kdl",
        "suite \"dangling\" {\n    tests \"ghost\"\n}\n",
    );

    let output = env
        .proctor()
        .args(["suite", "dangling", "nonexistent"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["missing"], serde_json::json!(["nonexistent"]));
    let member = &json["suites"][0]["tests"][0];
    assert_eq!(member["test"], "ghost");
    assert_eq!(member["passed"], false);
    assert!(member["error"].as_str().unwrap().contains("ghost"));
}
