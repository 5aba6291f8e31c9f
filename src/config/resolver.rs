//! Layered precedence resolution for settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Overrides - CLI flags the user explicitly supplied
//! 2. User - the persisted `settings.kdl` layer
//! 3. Built-in defaults
//!
//! A flag's own default is never turned into an override, so it cannot mask
//! a persisted value. Only the user layer is ever written back to storage.

use crate::config::schema::{self, Defaults, Layer};
use crate::config::value::{TypedValue, coerce};
use crate::select::Combinator;
use crate::storage::SettingsBackend;
use crate::{Error, Result};
use std::path::PathBuf;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from the persisted user settings
    User,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::User => write!(f, "user"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct SettingOverrides {
    layer: Layer,
}

impl SettingOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a setting.
    pub fn with(mut self, name: &str, value: impl Into<TypedValue>) -> Self {
        self.layer.insert(name.to_string(), value.into());
        self
    }

    /// Override a setting only if the flag was supplied.
    pub fn with_opt<V: Into<TypedValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    pub fn into_layer(self) -> Layer {
        self.layer
    }
}

/// The three-layer settings store handed to every command.
#[derive(Debug, Clone)]
pub struct Settings {
    defaults: Defaults,
    persisted: Layer,
    overrides: Layer,
    /// Problems found while loading the user layer
    warnings: Vec<String>,
}

impl Settings {
    /// A store holding only defaults.
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            persisted: Layer::new(),
            overrides: Layer::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the store from defaults and whatever the backend holds.
    ///
    /// A backend that cannot be read yields an empty user layer: running with
    /// no prior configuration is a normal state. The failure is kept in
    /// [`Settings::warnings`].
    pub fn load(defaults: Defaults, backend: &dyn SettingsBackend) -> Self {
        match backend.load() {
            Ok(layer) => Self::new(defaults).with_persisted(layer),
            Err(e) => {
                let mut settings = Self::new(defaults);
                settings.warnings.push(format!(
                    "Could not read settings from {}, using defaults: {}",
                    backend.location(),
                    e
                ));
                settings
            }
        }
    }

    /// Replace the user layer, dropping names that are not recognized.
    pub fn with_persisted(mut self, layer: Layer) -> Self {
        let (known, unknown): (Layer, Layer) = layer
            .into_iter()
            .partition(|(name, _)| self.defaults.contains(name));
        for name in unknown.keys() {
            self.warnings
                .push(format!("Ignoring unknown persisted setting: {}", name));
        }
        self.persisted = known;
        self
    }

    /// Warnings collected while loading.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Install this invocation's CLI overrides.
    pub fn with_overrides(mut self, overrides: SettingOverrides) -> Result<Self> {
        let layer = overrides.into_layer();
        if let Some(name) = layer.keys().find(|name| !self.defaults.contains(name)) {
            return Err(Error::UnknownSetting(name.clone()));
        }
        self.overrides = layer;
        Ok(self)
    }

    /// Effective value of a setting.
    pub fn resolve(&self, name: &str) -> Result<&TypedValue> {
        self.resolve_with_source(name).map(|r| r.value)
    }

    /// Effective value of a setting and the layer it came from.
    pub fn resolve_with_source(&self, name: &str) -> Result<Resolved<&TypedValue>> {
        let setting = self
            .defaults
            .get(name)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))?;

        if let Some(value) = self.overrides.get(name) {
            Ok(Resolved::new(value, ValueSource::CliFlag))
        } else if let Some(value) = self.persisted.get(name) {
            Ok(Resolved::new(value, ValueSource::User))
        } else {
            Ok(Resolved::new(&setting.value, ValueSource::Default))
        }
    }

    /// Description of a recognized setting.
    pub fn describe(&self, name: &str) -> Result<&'static str> {
        self.defaults
            .get(name)
            .map(|s| s.description)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))
    }

    /// Set a value in the user layer.
    pub fn update(&mut self, name: &str, value: TypedValue) -> Result<()> {
        if !self.defaults.contains(name) {
            return Err(Error::UnknownSetting(name.to_string()));
        }
        self.persisted.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove a value from the user layer. Returns whether one was present.
    pub fn reset(&mut self, name: &str) -> Result<bool> {
        if !self.defaults.contains(name) {
            return Err(Error::UnknownSetting(name.to_string()));
        }
        Ok(self.persisted.remove(name).is_some())
    }

    /// Write the user layer to the backend.
    pub fn save(&self, backend: &dyn SettingsBackend) -> Result<()> {
        tracing::debug!(location = %backend.location(), "saving settings");
        backend.save(&self.persisted)
    }

    /// The persisted user layer.
    pub fn persisted(&self) -> &Layer {
        &self.persisted
    }

    /// Recognized setting names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defaults.iter().map(|s| s.name)
    }

    // ==================== Typed Accessors ====================

    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.resolve(name)?;
        value
            .as_bool()
            .ok_or_else(|| invalid_value(name, "bool", value))
    }

    /// A scalar setting rendered as text. Lists are rejected.
    pub fn text(&self, name: &str) -> Result<String> {
        let value = self.resolve(name)?;
        match value {
            TypedValue::StringList(_) => Err(invalid_value(name, "single value", value)),
            _ => Ok(value.to_string()),
        }
    }

    pub fn path(&self, name: &str) -> Result<PathBuf> {
        self.text(name).map(PathBuf::from)
    }

    /// A list setting. A single string counts as a one-element list.
    pub fn list(&self, name: &str) -> Result<Vec<String>> {
        let value = self.resolve(name)?;
        value
            .to_list()
            .ok_or_else(|| invalid_value(name, "list", value))
    }

    /// The effective default tag combinator.
    pub fn combinator(&self) -> Result<Combinator> {
        let value = self.resolve(schema::TAG_OPERATOR)?;
        match value {
            TypedValue::String(s) => Combinator::parse(s),
            other => Err(Error::InvalidCombinator(other.to_string())),
        }
    }
}

fn invalid_value(name: &str, expected: &'static str, found: &TypedValue) -> Error {
    Error::InvalidSettingValue {
        name: name.to_string(),
        expected,
        found: format!("{} '{}'", found.kind(), found),
    }
}

/// Parse a `name=value` update token, coercing the value.
///
/// The token splits at the first `=`, so values may themselves contain `=`.
pub fn parse_update(token: &str) -> Result<(String, TypedValue)> {
    let (name, raw) = token
        .split_once('=')
        .ok_or_else(|| Error::MalformedUpdate(token.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::MalformedUpdate(token.to_string()));
    }
    Ok((name.to_string(), coerce(raw)))
}
