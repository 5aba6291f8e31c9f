//! The `template` command: scaffold test definition files.

use super::{Context, Output, json};
use crate::config::schema::TEMPLATE_OUTPUT_DIR;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Body written for each name. `{name}` is replaced with the test name.
pub const DEFAULT_TEMPLATE: &str = r#"test "{name}" {
    tags "new"
    command "sh" "-c" "echo 'not implemented: {name}'; exit 1"
}
"#;

const NAME_PLACEHOLDER: &str = "{name}";

/// A name that was not written.
#[derive(Serialize)]
pub struct TemplateSkip {
    pub name: String,
    pub reason: String,
}

/// Result of the `template` command.
#[derive(Serialize)]
pub struct TemplateResult {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<TemplateSkip>,
}

impl Output for TemplateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .written
            .iter()
            .map(|path| format!("Created {}", path.display()))
            .collect();
        for skip in &self.skipped {
            lines.push(format!("Skipped {}: {}", skip.name, skip.reason));
        }
        lines.join("\n")
    }

    fn success(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Write `<template_output_dir>/<name>.kdl` for each name. Existing files are
/// never overwritten.
pub fn template(ctx: &Context, names: &[String], template: Option<&Path>) -> Result<TemplateResult> {
    if names.is_empty() {
        return Err(Error::InvalidInput(
            "no test names given on the command line or stdin".to_string(),
        ));
    }

    let body = match template {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::NotFound(format!("template file {}: {}", path.display(), e))
        })?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let output_dir = ctx.settings.path(TEMPLATE_OUTPUT_DIR)?;
    fs::create_dir_all(&output_dir)?;

    let mut written = Vec::new();
    let mut skipped = Vec::new();

    for name in names {
        if let Some(reason) = invalid_name(name) {
            skipped.push(TemplateSkip {
                name: name.clone(),
                reason: reason.to_string(),
            });
            continue;
        }

        let path = output_dir.join(format!("{}.kdl", name));
        if path.exists() {
            skipped.push(TemplateSkip {
                name: name.clone(),
                reason: format!("{} already exists", path.display()),
            });
            continue;
        }

        fs::write(&path, body.replace(NAME_PLACEHOLDER, name))?;
        tracing::info!(path = %path.display(), "wrote template");
        written.push(path);
    }

    Ok(TemplateResult {
        output_dir,
        written,
        skipped,
    })
}

/// Names become file names and KDL strings.
fn invalid_name(name: &str) -> Option<&'static str> {
    if name == "." || name == ".." {
        Some("not a valid file name")
    } else if name.chars().any(std::path::is_separator) {
        Some("name contains a path separator")
    } else if name.contains(['"', '\\']) {
        Some("name contains a quote or backslash")
    } else {
        None
    }
}
