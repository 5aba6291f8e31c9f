//! Data models for Proctor entities.
//!
//! This module defines the core data structures:
//! - `TestDefinition` - A runnable test found in a search directory
//! - `SuiteDefinition` - A named group of tests
//! - `RunRecord` - The stored outcome of one test run

use crate::select::Taggable;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A test that can be run by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDefinition {
    /// Test name, unique across search directories
    pub name: String,

    /// Definition file this test was read from
    pub path: PathBuf,

    /// Tags for selection
    pub tags: Vec<String>,

    /// Program and arguments to execute
    pub command: Vec<String>,

    /// Working directory for execution (defaults to the definition's directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Kill the test after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl TestDefinition {
    /// Create a test definition with no tags, workdir or timeout.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tags: Vec::new(),
            command,
            workdir: None,
            timeout_secs: None,
        }
    }

    /// Directory the test runs in.
    pub fn working_dir(&self) -> PathBuf {
        let base = self
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        match &self.workdir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base,
        }
    }
}

impl Taggable for TestDefinition {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A named group of tests run together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteDefinition {
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    /// Member test names, in run order
    pub tests: Vec<String>,
}

impl Taggable for SuiteDefinition {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// The stored outcome of one test run (`run.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Test name
    pub name: String,

    /// Tags of the test at the time it ran
    #[serde(default)]
    pub tags: Vec<String>,

    /// Calendar date of the run, used for retention
    #[serde(with = "date_format")]
    pub date: NaiveDate,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Whether the test passed
    pub passed: bool,

    /// Exit code, if the process exited normally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Whether the run was killed by its timeout
    #[serde(default)]
    pub timed_out: bool,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// Run directory the record was loaded from
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Taggable for RunRecord {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Serde adapter keeping run dates in the shared calendar date format.
mod date_format {
    use crate::config::schema::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RunRecord {
        RunRecord {
            name: "login".to_string(),
            tags: vec!["smoke".to_string()],
            date: NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
            started_at: "2024-05-30T12:00:00Z".parse().unwrap(),
            passed: true,
            exit_code: Some(0),
            timed_out: false,
            duration_ms: 120,
            dir: PathBuf::new(),
        }
    }

    #[test]
    fn test_run_record_date_uses_calendar_format() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["date"], "2024-05-30");
        assert!(json.get("dir").is_none());
    }

    #[test]
    fn test_run_record_json_roundtrip() {
        let original = record();
        let text = serde_json::to_string(&original).unwrap();
        let parsed: RunRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_run_record_rejects_other_date_formats() {
        let text = r#"{"name":"x","date":"30/05/2024","started_at":"2024-05-30T12:00:00Z","passed":true,"duration_ms":1}"#;
        assert!(serde_json::from_str::<RunRecord>(text).is_err());
    }

    #[test]
    fn test_working_dir_resolution() {
        let mut test = TestDefinition::new(
            "login",
            "/repo/tests/login.kdl",
            vec!["true".to_string()],
        );
        assert_eq!(test.working_dir(), PathBuf::from("/repo/tests"));

        test.workdir = Some(PathBuf::from(".."));
        assert_eq!(test.working_dir(), PathBuf::from("/repo/tests/.."));

        test.workdir = Some(PathBuf::from("/abs"));
        assert_eq!(test.working_dir(), PathBuf::from("/abs"));
    }
}
