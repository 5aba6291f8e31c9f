//! CLI argument definitions for Proctor.

use crate::commands::Command;
use crate::config::schema::{
    CLEANUP_ON_PASS, DEBUG, FORCE_CLEAN, NEWEST_TEST_RUN, OLDEST_TEST_RUN, RUNS_DIR, SEARCH_DIRS,
    STDOUT, TAG_OPERATOR, TEMPLATE_OUTPUT_DIR,
};
use crate::config::{SettingOverrides, coerce};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Proctor - locate, run and clean up tests and test suites.
///
/// Settings persist across runs (see `proctor settings`); flags override them
/// for a single invocation.
#[derive(Parser, Debug)]
#[command(name = "proctor")]
#[command(author, version, about = "Locate, run and clean up tests and test suites", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory where run artifacts are stored
    #[arg(long, global = true)]
    pub runs_dir: Option<PathBuf>,

    /// Directory to search for test and suite definitions (repeatable)
    #[arg(long = "search-dir", global = true)]
    pub search_dirs: Vec<String>,

    /// Delete a run's artifacts when the test passes (`--cleanup-on-pass=false` to keep them)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub cleanup_on_pass: Option<bool>,

    /// Mirror log output to the console (stderr)
    #[arg(long, global = true)]
    pub stdout: bool,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single test by name
    Run {
        /// Test name
        name: String,
    },

    /// Run test suites by name and/or tag
    ///
    /// With no names, every suite is a candidate. Suite names may also be
    /// piped in on stdin.
    Suite {
        /// Suite names
        names: Vec<String>,

        /// Only suites with this tag (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        /// How multiple tags combine
        #[arg(long, value_parser = ["any", "all"], ignore_case = true)]
        tag_operator: Option<String>,
    },

    /// List tests and suites
    List {
        /// Only items with this tag (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        /// How multiple tags combine
        #[arg(long, value_parser = ["any", "all"], ignore_case = true)]
        tag_operator: Option<String>,
    },

    /// Remove stored test runs
    ///
    /// Without --force (or the force_clean setting) this only reports what
    /// would be removed. Test names may also be piped in on stdin.
    Clean {
        /// Only runs of these tests
        names: Vec<String>,

        /// Only runs with this tag (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        /// How multiple tags combine
        #[arg(long, value_parser = ["any", "all"], ignore_case = true)]
        tag_operator: Option<String>,

        /// Oldest run to remove: days before today (e.g. 14) or YYYY-MM-DD
        #[arg(long)]
        oldest: Option<String>,

        /// Newest run to remove: YYYY-MM-DD
        #[arg(long)]
        newest: Option<String>,

        /// Actually delete the runs
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Write test definition templates
    ///
    /// Creates <output-dir>/<name>.kdl for each name. Names may also be
    /// piped in on stdin.
    Template {
        /// Test names
        names: Vec<String>,

        /// Directory to write templates to
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// File to use instead of the built-in template ({name} is replaced)
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Show and change persisted settings
    ///
    /// Examples:
    ///   proctor settings
    ///   proctor settings tag_operator=all oldest_test_run=14
    ///   proctor settings --reset tag_operator
    Settings {
        /// Show a description of each setting
        #[arg(short = 'd', long)]
        describe: bool,

        /// Updates as NAME=VALUE
        updates: Vec<String>,

        /// Restore a setting to its default (repeatable)
        #[arg(short = 'r', long = "reset", value_name = "NAME")]
        resets: Vec<String>,
    },

    /// Show version information
    Version,
}

impl Cli {
    /// Overrides for the flags the user actually passed.
    pub fn setting_overrides(&self) -> SettingOverrides {
        let mut overrides = SettingOverrides::new()
            .with_opt(
                RUNS_DIR,
                self.runs_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            )
            .with_opt(CLEANUP_ON_PASS, self.cleanup_on_pass)
            .with_opt(STDOUT, self.stdout.then_some(true))
            .with_opt(DEBUG, self.debug.then_some(true));

        if !self.search_dirs.is_empty() {
            overrides = overrides.with(SEARCH_DIRS, self.search_dirs.clone());
        }

        match &self.command {
            Commands::Suite { tag_operator, .. } | Commands::List { tag_operator, .. } => {
                overrides = overrides.with_opt(TAG_OPERATOR, lowercase(tag_operator));
            }
            Commands::Clean {
                tag_operator,
                oldest,
                newest,
                force,
                ..
            } => {
                overrides = overrides
                    .with_opt(TAG_OPERATOR, lowercase(tag_operator))
                    .with_opt(OLDEST_TEST_RUN, oldest.as_deref().map(coerce))
                    .with_opt(NEWEST_TEST_RUN, newest.as_deref().map(coerce))
                    .with_opt(FORCE_CLEAN, force.then_some(true));
            }
            Commands::Template { output_dir, .. } => {
                overrides = overrides.with_opt(
                    TEMPLATE_OUTPUT_DIR,
                    output_dir.as_ref().map(|p| p.to_string_lossy().to_string()),
                );
            }
            Commands::Run { .. } | Commands::Settings { .. } | Commands::Version => {}
        }

        overrides
    }

    /// The command to dispatch, without its setting-backed flags.
    pub fn to_command(&self) -> Command {
        match &self.command {
            Commands::Run { name } => Command::RunTest { name: name.clone() },
            Commands::Suite { names, tags, .. } => Command::RunSuite {
                names: names.clone(),
                tags: tags.clone(),
            },
            Commands::List { tags, .. } => Command::List { tags: tags.clone() },
            Commands::Clean { names, tags, .. } => Command::Clean {
                names: names.clone(),
                tags: tags.clone(),
            },
            Commands::Template {
                names, template, ..
            } => Command::Template {
                names: names.clone(),
                template: template.clone(),
            },
            Commands::Settings {
                describe,
                updates,
                resets,
            } => Command::Settings {
                show_descriptions: *describe,
                updates: updates.clone(),
                resets: resets.clone(),
            },
            Commands::Version => Command::Version,
        }
    }
}

fn lowercase(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.to_lowercase())
}
