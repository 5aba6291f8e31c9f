//! Common test utilities for proctor integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real settings or run history.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;
use walkdir::WalkDir;

/// A test environment with isolated directories.
///
/// - `work_dir`: current directory for commands; the default search dir
/// - `config_dir`: holds `settings.kdl` (via `PROCTOR_CONFIG_DIR`)
/// - `data_dir`: holds runs and the log (via `PROCTOR_DATA_DIR`)
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the proctor binary with isolated directories.
    pub fn proctor(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_proctor"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("PROCTOR_CONFIG_DIR", self.config_dir.path());
        cmd.env("PROCTOR_DATA_DIR", self.data_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a definition file below the work dir.
    pub fn write_defs(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.path().join("settings.kdl")
    }

    /// Default runs directory.
    pub fn runs_path(&self) -> PathBuf {
        self.data_dir.path().join("runs")
    }

    /// `run.json` files currently stored under the default runs directory.
    pub fn run_records(&self) -> Vec<PathBuf> {
        let mut records: Vec<PathBuf> = WalkDir::new(self.runs_path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() == "run.json")
            .map(|e| e.into_path())
            .collect();
        records.sort();
        records
    }

    /// Store a fake run record for `name` dated `date` (YYYY-MM-DD).
    pub fn seed_run(&self, name: &str, tags: &[&str], date: &str) -> PathBuf {
        let dir = self.runs_path().join(name).join(format!("{}T120000.000", date.replace('-', "")));
        fs::create_dir_all(&dir).unwrap();
        let record = serde_json::json!({
            "name": name,
            "tags": tags,
            "date": date,
            "started_at": format!("{}T12:00:00Z", date),
            "passed": true,
            "exit_code": 0,
            "timed_out": false,
            "duration_ms": 3,
        });
        fs::write(dir.join("run.json"), record.to_string()).unwrap();
        dir
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Definitions shared by most tests.
pub const SAMPLE_DEFS: &str = r#"
test "login" {
    tags "auth" "fast"
    command "sh" "-c" "echo logging in"
}

test "logout" {
    tags "auth"
    command "sh" "-c" "exit 0"
}

test "broken" {
    tags "flaky"
    command "sh" "-c" "echo nope >&2; exit 2"
}

suite "auth" {
    tags "fast"
    tests "login" "logout"
}

suite "everything" {
    tags "slow"
    tests "login" "broken"
}
"#;
