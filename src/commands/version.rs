//! The `version` command.

use super::{Output, json};
use serde::Serialize;

/// Build information baked in by `build.rs`.
#[derive(Serialize)]
pub struct VersionResult {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl Output for VersionResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("proctor {} ({}, built {})", self.version, self.commit, self.built)
    }
}

pub fn version() -> VersionResult {
    VersionResult {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("PROCTOR_GIT_COMMIT"),
        built: env!("PROCTOR_BUILD_TIMESTAMP"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_human() {
        let human = version().to_human();
        assert!(human.starts_with(&format!("proctor {}", env!("CARGO_PKG_VERSION"))));
    }
}
