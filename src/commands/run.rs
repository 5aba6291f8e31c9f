//! The `run` and `suite` commands.

use super::{Context, Output, json};
use crate::models::TestDefinition;
use crate::select::TagQuery;
use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Result of running a single test.
#[derive(Serialize)]
pub struct RunTestResult {
    pub test: String,
    pub path: PathBuf,
    pub passed: bool,
}

impl Output for RunTestResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("{} {}", verdict(self.passed), self.test)
    }

    fn success(&self) -> bool {
        self.passed
    }
}

/// Run one test by name.
pub fn run_test(ctx: &Context, name: &str) -> Result<RunTestResult> {
    let definitions = ctx.collaborators.definitions()?;
    let test = definitions
        .find_test(name)?
        .ok_or_else(|| Error::NotFound(format!("test '{}'", name)))?;

    let passed = ctx.collaborators.runner()?.run(&test)?;
    Ok(RunTestResult {
        test: test.name,
        path: test.path,
        passed,
    })
}

/// Outcome of one suite member.
#[derive(Serialize)]
pub struct TestOutcome {
    pub test: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one suite.
#[derive(Serialize)]
pub struct SuiteRun {
    pub suite: String,
    pub passed: bool,
    pub tests: Vec<TestOutcome>,
}

/// Result of the `suite` command.
#[derive(Serialize)]
pub struct SuiteResult {
    pub suites: Vec<SuiteRun>,
    /// Requested suite names that do not exist
    pub missing: Vec<String>,
    pub passed: bool,
}

impl Output for SuiteResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.suites.is_empty() {
            lines.push("No suites matched.".to_string());
        }
        for suite in &self.suites {
            lines.push(format!("{} {}", verdict(suite.passed), suite.suite));
            for test in &suite.tests {
                match &test.error {
                    Some(error) => {
                        lines.push(format!("  {} {} ({})", verdict(test.passed), test.test, error))
                    }
                    None => lines.push(format!("  {} {}", verdict(test.passed), test.test)),
                }
            }
        }
        for name in &self.missing {
            lines.push(format!("Suite not found: {}", name));
        }
        lines.join("\n")
    }

    fn success(&self) -> bool {
        self.passed
    }
}

/// Run suites selected by name (all suites when `names` is empty), then
/// narrowed by tags under the effective tag operator.
pub fn run_suite(ctx: &Context, names: &[String], tags: &[String]) -> Result<SuiteResult> {
    let query = TagQuery::new(tags, ctx.settings.combinator()?);
    let definitions = ctx.collaborators.definitions()?;
    let all = definitions.suites()?;

    let mut missing = Vec::new();
    let selected: Vec<_> = if names.is_empty() {
        all
    } else {
        names
            .iter()
            .filter_map(|name| {
                let found = all.iter().find(|s| &s.name == name).cloned();
                if found.is_none() {
                    missing.push(name.clone());
                }
                found
            })
            .collect()
    };

    let tests = definitions.tests()?;
    let runner = ctx.collaborators.runner()?;
    let mut suites = Vec::new();

    for suite in selected.into_iter().filter(|s| query.matches(s)) {
        tracing::info!(suite = %suite.name, tests = suite.tests.len(), "running suite");
        let outcomes: Vec<TestOutcome> = suite
            .tests
            .iter()
            .map(|member| run_member(runner.as_ref(), &tests, member))
            .collect();
        suites.push(SuiteRun {
            passed: outcomes.iter().all(|o| o.passed),
            suite: suite.name,
            tests: outcomes,
        });
    }

    let passed = missing.is_empty() && suites.iter().all(|s| s.passed);
    Ok(SuiteResult {
        suites,
        missing,
        passed,
    })
}

/// Run one suite member. Members that cannot be found or run count as failures.
fn run_member(
    runner: &dyn crate::runner::TestRunner,
    tests: &[TestDefinition],
    member: &str,
) -> TestOutcome {
    let result = tests
        .iter()
        .find(|t| t.name == member)
        .ok_or_else(|| Error::NotFound(format!("test '{}'", member)))
        .and_then(|test| runner.run(test));

    match result {
        Ok(passed) => TestOutcome {
            test: member.to_string(),
            passed,
            error: None,
        },
        Err(e) => {
            tracing::warn!(test = member, error = %e, "suite member did not run");
            TestOutcome {
                test: member.to_string(),
                passed: false,
                error: Some(e.to_string()),
            }
        }
    }
}

fn verdict(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}
