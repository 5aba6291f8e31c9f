//! Proctor - locate, run and clean up tests and test suites.
//!
//! This library provides the core functionality for the `proctor` CLI tool:
//! layered settings resolution, tag-based selection, retention windows for
//! run cleanup, and the command dispatcher that ties them to the test
//! discovery, execution and history collaborators.

pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod history;
pub mod logging;
pub mod models;
pub mod runner;
pub mod select;
pub mod storage;

use chrono::NaiveDate;

/// Library-level error type for Proctor operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Malformed setting update '{0}': expected NAME=VALUE")]
    MalformedUpdate(String),

    #[error("Setting {name} must be a {expected}, got {found}")]
    InvalidSettingValue {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid tag operator '{0}': expected 'any' or 'all'")]
    InvalidCombinator(String),

    #[error("Invalid date '{value}': expected {expected}")]
    InvalidDateSpec {
        value: String,
        expected: &'static str,
    },

    #[error("Invalid retention window: oldest {oldest} is after newest {newest}")]
    InvertedWindow { oldest: NaiveDate, newest: NaiveDate },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Proctor operations.
pub type Result<T> = std::result::Result<T, Error>;
