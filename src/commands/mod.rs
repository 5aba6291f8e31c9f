//! Command implementations for the Proctor CLI.
//!
//! Each command has a handler taking an immutable [`Context`] and returning a
//! result that implements [`Output`]. [`dispatch`] maps a parsed [`Command`]
//! to its handler after merging name lists from the command line and from
//! piped input.
//!
//! Flags that correspond to settings (tag operator, retention bounds, force,
//! output directory) are not part of [`Command`]: they arrive as overrides on
//! the [`Settings`] in the context, so handlers see one resolved value.

mod clean;
mod list;
mod run;
mod settings;
mod template;
mod version;

pub use clean::{CleanFailure, CleanResult, CleanedRun, clean};
pub use list::{ItemKind, ListItem, ListResult, list};
pub use run::{RunTestResult, SuiteResult, SuiteRun, TestOutcome, run_suite, run_test};
pub use settings::{SettingEntry, SettingsResult, UpdateError, settings};
pub use template::{DEFAULT_TEMPLATE, TemplateResult, TemplateSkip, template};
pub use version::{VersionResult, version};

use crate::Result;
use crate::config::Settings;
use crate::config::schema::{CLEANUP_ON_PASS, RUNS_DIR, SEARCH_DIRS};
use crate::discovery::{DefinitionSource, KdlDefinitionSource};
use crate::history::{DirRunHistory, RunHistory};
use crate::runner::{ProcessRunner, TestRunner};
use crate::storage::SettingsBackend;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;

    /// Whether the process should exit successfully.
    fn success(&self) -> bool {
        true
    }
}

/// Serialize a result, falling back to an error object.
pub(crate) fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// A parsed command, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one test by name
    RunTest { name: String },
    /// Run suites by name and/or tags
    RunSuite {
        names: Vec<String>,
        tags: Vec<String>,
    },
    /// List tests and suites matching tags
    List { tags: Vec<String> },
    /// Remove stored runs
    Clean {
        names: Vec<String>,
        tags: Vec<String>,
    },
    /// Write test definition templates
    Template {
        names: Vec<String>,
        template: Option<PathBuf>,
    },
    /// Show and change settings
    Settings {
        show_descriptions: bool,
        updates: Vec<String>,
        resets: Vec<String>,
    },
    /// Show version information
    Version,
}

impl Command {
    /// Command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RunTest { .. } => "run",
            Command::RunSuite { .. } => "suite",
            Command::List { .. } => "list",
            Command::Clean { .. } => "clean",
            Command::Template { .. } => "template",
            Command::Settings { .. } => "settings",
            Command::Version => "version",
        }
    }

    /// Whether this command takes additional names from piped input.
    pub fn accepts_piped_names(&self) -> bool {
        matches!(
            self,
            Command::RunSuite { .. } | Command::Clean { .. } | Command::Template { .. }
        )
    }
}

/// Access to the external collaborators a command may need.
///
/// Collaborators are built on demand so that commands which never touch them
/// (`settings`, `version`) still work when their settings are invalid.
pub trait Collaborators {
    fn definitions(&self) -> Result<Box<dyn DefinitionSource + '_>>;
    fn history(&self) -> Result<Box<dyn RunHistory + '_>>;
    fn runner(&self) -> Result<Box<dyn TestRunner + '_>>;
}

/// Filesystem-backed collaborators configured from settings.
pub struct FsCollaborators<'a> {
    settings: &'a Settings,
}

impl<'a> FsCollaborators<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl Collaborators for FsCollaborators<'_> {
    fn definitions(&self) -> Result<Box<dyn DefinitionSource + '_>> {
        let dirs = self
            .settings
            .list(SEARCH_DIRS)?
            .into_iter()
            .map(PathBuf::from)
            .collect();
        Ok(Box::new(KdlDefinitionSource::new(dirs)))
    }

    fn history(&self) -> Result<Box<dyn RunHistory + '_>> {
        Ok(Box::new(DirRunHistory::new(self.settings.path(RUNS_DIR)?)))
    }

    fn runner(&self) -> Result<Box<dyn TestRunner + '_>> {
        Ok(Box::new(ProcessRunner::new(
            self.settings.path(RUNS_DIR)?,
            self.settings.bool(CLEANUP_ON_PASS)?,
        )))
    }
}

/// Everything a handler may read.
pub struct Context<'a> {
    /// Resolved settings for this invocation
    pub settings: &'a Settings,
    /// Where the settings command persists changes
    pub backend: &'a dyn SettingsBackend,
    /// External collaborators
    pub collaborators: &'a dyn Collaborators,
    /// The date retention windows are anchored to
    pub today: NaiveDate,
}

/// Merge command-line and piped names into a sorted, duplicate-free list.
pub fn merge_names(cli: &[String], piped: &[String]) -> Vec<String> {
    cli.iter()
        .chain(piped)
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Split piped input into names, one or more per line.
pub fn parse_piped_names(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Run a command against its handler.
pub fn dispatch(ctx: &Context, command: Command, piped: &[String]) -> Result<Box<dyn Output>> {
    tracing::debug!(command = command.name(), "dispatching");

    let output: Box<dyn Output> = match command {
        Command::RunTest { name } => Box::new(run_test(ctx, &name)?),
        Command::RunSuite { names, tags } => {
            Box::new(run_suite(ctx, &merge_names(&names, piped), &tags)?)
        }
        Command::List { tags } => Box::new(list(ctx, &tags)?),
        Command::Clean { names, tags } => Box::new(clean(ctx, &merge_names(&names, piped), &tags)?),
        Command::Template { names, template: path } => {
            Box::new(template(ctx, &merge_names(&names, piped), path.as_deref())?)
        }
        Command::Settings {
            show_descriptions,
            updates,
            resets,
        } => Box::new(settings(ctx, show_descriptions, &updates, &resets)?),
        Command::Version => Box::new(version()),
    };

    Ok(output)
}
