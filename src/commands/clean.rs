//! The `clean` command.

use super::{Context, Output, json};
use crate::Result;
use crate::config::schema::{FORCE_CLEAN, NEWEST_TEST_RUN, OLDEST_TEST_RUN};
use crate::select::{TagQuery, format_date, resolve_window};
use serde::Serialize;
use std::path::PathBuf;

/// A stored run selected for removal.
#[derive(Serialize)]
pub struct CleanedRun {
    pub test: String,
    pub date: String,
    pub passed: bool,
    pub dir: PathBuf,
}

/// A selected run that could not be removed.
#[derive(Serialize)]
pub struct CleanFailure {
    pub test: String,
    pub dir: PathBuf,
    pub error: String,
}

/// Result of the `clean` command.
#[derive(Serialize)]
pub struct CleanResult {
    pub oldest: String,
    pub newest: String,
    /// Whether runs were only reported, not removed
    pub dry_run: bool,
    /// Runs removed, or that would be removed on a dry run
    pub runs: Vec<CleanedRun>,
    pub failures: Vec<CleanFailure>,
}

impl Output for CleanResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.dry_run { "Would remove" } else { "Removed" };
        let mut lines = vec![format!(
            "{} {} run(s) from {} to {}",
            verb,
            self.runs.len(),
            self.oldest,
            self.newest
        )];
        for run in &self.runs {
            lines.push(format!("  {} {} {}", run.date, run.test, run.dir.display()));
        }
        if self.dry_run && !self.runs.is_empty() {
            lines.push("Pass --force to remove them.".to_string());
        }
        if !self.failures.is_empty() {
            lines.push(format!("Failed to remove {} run(s):", self.failures.len()));
            for failure in &self.failures {
                lines.push(format!(
                    "  {} {}: {}",
                    failure.test,
                    failure.dir.display(),
                    failure.error
                ));
            }
        }
        lines.join("\n")
    }

    fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Remove stored runs matching `names` (all when empty) and `tags` whose date
/// falls inside the retention window. Without `force_clean` the runs are only
/// reported. A run that cannot be removed is reported as a failure and the
/// remaining runs are still removed.
pub fn clean(ctx: &Context, names: &[String], tags: &[String]) -> Result<CleanResult> {
    let query = TagQuery::new(tags, ctx.settings.combinator()?);
    let window = resolve_window(
        &ctx.settings.text(OLDEST_TEST_RUN)?,
        &ctx.settings.text(NEWEST_TEST_RUN)?,
        ctx.today,
    )?;
    let force = ctx.settings.bool(FORCE_CLEAN)?;

    let history = ctx.collaborators.history()?;
    let targets: Vec<_> = history
        .records()?
        .into_iter()
        .filter(|r| names.is_empty() || names.contains(&r.name))
        .filter(|r| query.matches(r))
        .filter(|r| window.contains(r.date))
        .collect();

    let mut runs = Vec::new();
    let mut failures = Vec::new();
    for record in targets {
        if force && let Err(e) = history.remove(&record) {
            tracing::warn!(
                test = %record.name,
                dir = %record.dir.display(),
                error = %e,
                "failed to remove run"
            );
            failures.push(CleanFailure {
                test: record.name,
                dir: record.dir,
                error: e.to_string(),
            });
            continue;
        }
        runs.push(CleanedRun {
            date: format_date(record.date),
            test: record.name,
            passed: record.passed,
            dir: record.dir,
        });
    }
    if force {
        tracing::info!(removed = runs.len(), failed = failures.len(), "cleaned runs");
    }

    Ok(CleanResult {
        oldest: format_date(window.oldest()),
        newest: format_date(window.newest()),
        dry_run: !force,
        runs,
        failures,
    })
}
