//! Integration tests for `proctor template`.

mod common;

use common::{TestEnv, stdout_json};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_template_writes_files_that_list_finds() {
    let env = TestEnv::new();

    env.proctor()
        .args(["template", "beta", "alpha"])
        .assert()
        .success();

    assert!(env.work_path().join("alpha.kdl").is_file());
    assert!(env.work_path().join("beta.kdl").is_file());

    let output = env.proctor().args(["list", "-t", "new"]).output().unwrap();
    let json = stdout_json(&output);
    let names: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[test]
fn test_template_output_dir_and_stdin() {
    let env = TestEnv::new();

    env.proctor()
        .args(["-H", "template", "one", "-o", "defs"])
        .write_stdin("two\none\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("one.kdl"))
        .stdout(predicate::str::contains("two.kdl"));

    assert!(env.work_path().join("defs/one.kdl").is_file());
    assert!(env.work_path().join("defs/two.kdl").is_file());
}

#[test]
fn test_template_output_dir_setting() {
    let env = TestEnv::new();
    env.proctor()
        .args(["settings", "template_output_dir=generated"])
        .assert()
        .success();

    env.proctor().args(["template", "x"]).assert().success();
    assert!(env.work_path().join("generated/x.kdl").is_file());
}

#[test]
fn test_template_does_not_overwrite() {
    let env = TestEnv::new();
    env.write_defs("keep.kdl", "// mine\n");

    let output = env
        .proctor()
        .args(["template", "keep", "fresh"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["skipped"][0]["name"], "keep");
    assert_eq!(json["written"].as_array().unwrap().len(), 1);
    assert_eq!(
        fs::read_to_string(env.work_path().join("keep.kdl")).unwrap(),
        "// mine\n"
    );
}

#[test]
fn test_template_custom_file() {
    let env = TestEnv::new();
    let custom = env.write_defs("custom.tmpl", "test \"{name}\" {\n    command \"make\" \"{name}\"\n}\n");

    env.proctor()
        .args(["template", "build", "--template"])
        .arg(&custom)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(env.work_path().join("build.kdl")).unwrap(),
        "test \"build\" {\n    command \"make\" \"build\"\n}\n"
    );
}

#[test]
fn test_template_without_names() {
    let env = TestEnv::new();

    env.proctor()
        .arg("template")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no test names given"));
}
