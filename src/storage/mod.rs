//! Storage locations and the persistence backends for user settings.
//!
//! Paths follow XDG conventions via `dirs`:
//! - Settings: `~/.config/proctor/settings.kdl` (override with `PROCTOR_CONFIG_DIR`)
//! - Data: `~/.local/share/proctor/` (override with `PROCTOR_DATA_DIR`), which
//!   holds the default runs directory and `proctor.log`

pub mod backend;

pub use backend::{KdlFileBackend, MemoryBackend, SettingsBackend};

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "PROCTOR_CONFIG_DIR";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PROCTOR_DATA_DIR";

/// File name of the persisted settings inside the config directory.
pub const SETTINGS_FILE: &str = "settings.kdl";

/// Resolve the directory that holds `settings.kdl`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = env_dir(CONFIG_DIR_ENV) {
        return Ok(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("proctor"))
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))
}

/// Resolve the directory that holds run artifacts and logs.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = env_dir(DATA_DIR_ENV) {
        return Ok(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("proctor"))
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
