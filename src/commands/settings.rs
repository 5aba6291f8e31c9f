//! The `settings` command: show, update and reset persisted settings.

use super::{Context, Output, json};
use crate::Result;
use crate::config::{TypedValue, parse_update};
use serde::Serialize;

/// One setting's effective value.
#[derive(Serialize)]
pub struct SettingEntry {
    pub name: String,
    pub value: TypedValue,
    /// Layer the value came from: cli, user or default
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An update or reset that could not be applied.
#[derive(Serialize)]
pub struct UpdateError {
    pub item: String,
    pub error: String,
}

/// Result of the `settings` command.
#[derive(Serialize)]
pub struct SettingsResult {
    pub settings: Vec<SettingEntry>,
    /// Changes applied to the user layer
    pub applied: Vec<String>,
    pub errors: Vec<UpdateError>,
    /// Whether the user layer was written
    pub saved: bool,
}

impl Output for SettingsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let width = self.settings.iter().map(|s| s.name.len()).max().unwrap_or(0);
        let mut lines = Vec::new();

        for change in &self.applied {
            lines.push(format!("Updated {}", change));
        }
        for error in &self.errors {
            lines.push(format!("Error: {}: {}", error.item, error.error));
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }

        for entry in &self.settings {
            lines.push(format!(
                "{:width$}  {} ({})",
                entry.name,
                entry.value,
                entry.source,
                width = width
            ));
            if let Some(description) = &entry.description {
                lines.push(format!("{:width$}  {}", "", description, width = width));
            }
        }
        lines.join("\n")
    }

    fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Apply `updates` (`name=value` tokens) and `resets` (names) to the user
/// layer, save once if anything changed, and list every setting.
///
/// A bad item is reported and skipped; the rest of the batch still applies.
pub fn settings(
    ctx: &Context,
    show_descriptions: bool,
    updates: &[String],
    resets: &[String],
) -> Result<SettingsResult> {
    let mut settings = ctx.settings.clone();
    let mut applied = Vec::new();
    let mut errors = Vec::new();

    for token in updates {
        let outcome = parse_update(token).and_then(|(name, value)| {
            let change = format!("{}={}", name, value);
            settings.update(&name, value).map(|()| change)
        });
        match outcome {
            Ok(change) => applied.push(change),
            Err(e) => errors.push(UpdateError {
                item: token.clone(),
                error: e.to_string(),
            }),
        }
    }

    for name in resets {
        match settings.reset(name) {
            Ok(_) => applied.push(format!("{} reset to default", name)),
            Err(e) => errors.push(UpdateError {
                item: name.clone(),
                error: e.to_string(),
            }),
        }
    }

    let saved = !applied.is_empty();
    if saved {
        settings.save(ctx.backend)?;
        tracing::info!(changes = applied.len(), location = %ctx.backend.location(), "saved settings");
    }

    let mut entries = Vec::new();
    for name in settings.names() {
        let resolved = settings.resolve_with_source(name)?;
        entries.push(SettingEntry {
            name: name.to_string(),
            value: resolved.value.clone(),
            source: resolved.source.to_string(),
            description: if show_descriptions {
                Some(settings.describe(name)?.to_string())
            } else {
                None
            },
        });
    }

    Ok(SettingsResult {
        settings: entries,
        applied,
        errors,
        saved,
    })
}
