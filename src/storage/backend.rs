//! Settings backend trait and implementations.
//!
//! This module provides the persistence media for the user settings layer:
//! - `KdlFileBackend` - `settings.kdl` in the user config directory (default)
//! - `MemoryBackend` - in-process storage for tests and embedding

use crate::config::schema::{Layer, layer_from_kdl, layer_to_kdl};
use crate::{Error, Result};
use kdl::KdlDocument;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for backends that persist the user settings layer.
///
/// A backend with nothing stored yet returns an empty layer from `load`.
/// `save` replaces the stored layer wholesale.
pub trait SettingsBackend {
    /// Load the stored layer.
    fn load(&self) -> Result<Layer>;

    /// Replace the stored layer.
    fn save(&self, layer: &Layer) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;
}

/// Settings stored as KDL in a single file.
#[derive(Debug, Clone)]
pub struct KdlFileBackend {
    path: PathBuf,
}

impl KdlFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend for `settings.kdl` inside `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(super::SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for KdlFileBackend {
    fn load(&self) -> Result<Layer> {
        if !self.path.exists() {
            return Ok(Layer::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let doc: KdlDocument = content.parse().map_err(|e| {
            Error::Other(format!(
                "Failed to parse KDL in {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(layer_from_kdl(&doc))
    }

    fn save(&self, layer: &Layer) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, layer_to_kdl(layer).to_string())?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Settings kept in memory for the lifetime of the backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    layer: RefCell<Layer>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored layer.
    pub fn with_layer(layer: Layer) -> Self {
        Self {
            layer: RefCell::new(layer),
        }
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> Result<Layer> {
        Ok(self.layer.borrow().clone())
    }

    fn save(&self, layer: &Layer) -> Result<()> {
        *self.layer.borrow_mut() = layer.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
