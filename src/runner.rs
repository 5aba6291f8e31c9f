//! Test execution.
//!
//! `ProcessRunner` spawns a test's command in its working directory, captures
//! stdout and stderr into the run directory, enforces the optional timeout and
//! writes the run record.

use crate::history::{DirRunHistory, RUN_OUTPUT_FILE, RunHistory, write_record};
use crate::models::{RunRecord, TestDefinition};
use crate::{Error, Result};
use chrono::{Local, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Runs a single test and reports whether it passed.
pub trait TestRunner {
    fn run(&self, test: &TestDefinition) -> Result<bool>;
}

impl<T: TestRunner + ?Sized> TestRunner for &T {
    fn run(&self, test: &TestDefinition) -> Result<bool> {
        (**self).run(test)
    }
}

/// Runs tests as child processes and records each run on disk.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    history: DirRunHistory,
    cleanup_on_pass: bool,
}

impl ProcessRunner {
    pub fn new(runs_dir: impl Into<PathBuf>, cleanup_on_pass: bool) -> Self {
        Self {
            history: DirRunHistory::new(runs_dir),
            cleanup_on_pass,
        }
    }

    fn run_dir(&self, test: &TestDefinition, stamp: &str) -> PathBuf {
        let safe_name: String = test
            .name
            .chars()
            .map(|c| if std::path::is_separator(c) { '_' } else { c })
            .collect();
        self.history.runs_dir().join(safe_name).join(stamp)
    }
}

impl TestRunner for ProcessRunner {
    fn run(&self, test: &TestDefinition) -> Result<bool> {
        let (program, args) = test
            .command
            .split_first()
            .ok_or_else(|| Error::InvalidInput(format!("test {} has no command", test.name)))?;

        let started_at = Utc::now();
        let dir = self.run_dir(test, &started_at.format("%Y%m%dT%H%M%S%.3f").to_string());
        fs::create_dir_all(&dir)?;
        let mut log = File::create(dir.join(RUN_OUTPUT_FILE))?;

        tracing::info!(test = %test.name, dir = %dir.display(), "running test");
        let start = Instant::now();

        let spawned = Command::new(program)
            .args(args)
            .current_dir(test.working_dir())
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log.try_clone()?)
            .spawn();

        let (status, timed_out) = match spawned {
            Ok(mut child) => match test.timeout_secs {
                Some(secs) => match child.wait_timeout(Duration::from_secs(secs))? {
                    Some(status) => (Some(status), false),
                    None => {
                        // Already-exited races are fine; wait() reaps either way
                        let _ = child.kill();
                        child.wait()?;
                        (None, true)
                    }
                },
                None => (Some(child.wait()?), false),
            },
            Err(e) => {
                writeln!(log, "proctor: failed to start {}: {}", program, e)?;
                tracing::warn!(test = %test.name, error = %e, "failed to start test");
                (None, false)
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let passed = status.as_ref().is_some_and(ExitStatus::success);

        if timed_out {
            writeln!(log, "proctor: killed after {}s timeout", test.timeout_secs.unwrap_or_default())?;
        }

        let record = RunRecord {
            name: test.name.clone(),
            tags: test.tags.clone(),
            date: started_at.with_timezone(&Local).date_naive(),
            started_at,
            passed,
            exit_code: status.and_then(|s| s.code()),
            timed_out,
            duration_ms,
            dir,
        };
        write_record(&record)?;

        tracing::info!(test = %test.name, passed, duration_ms, timed_out, "test finished");

        if passed && self.cleanup_on_pass {
            self.history.remove(&record)?;
        }

        Ok(passed)
    }
}
