//! Custom configuration discovery and loading.
//!
//! The override file lives at `<user-config-dir>/dev-janitor/package-managers.json`.
//! Discovery treats a missing or malformed file as "no overrides"; the strict
//! loader is there for commands that want to report the parse error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{JanitorError, Result};

use super::schema::CustomConfig;

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "dev-janitor";

/// Override file name.
pub const CONFIG_FILE: &str = "package-managers.json";

/// Default location of the override file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load and parse a config file.
///
/// # Errors
///
/// Returns `Io` if the file can't be read.
/// Returns `ConfigParseError` if the JSON is invalid.
pub fn load_config_file(path: &Path) -> Result<CustomConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Parse JSON content into a [`CustomConfig`].
pub fn parse_config(content: &str, source_path: &Path) -> Result<CustomConfig> {
    serde_json::from_str(content).map_err(|e| JanitorError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file, degrading any failure to `None`.
pub fn load_optional(path: &Path) -> Option<CustomConfig> {
    if !path.exists() {
        tracing::debug!("No custom config at {}", path.display());
        return None;
    }

    match load_config_file(path) {
        Ok(config) => {
            tracing::debug!("Loaded custom config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Ignoring custom config: {}", e);
            None
        }
    }
}

impl CustomConfig {
    /// Load the override file from its default location.
    pub fn load() -> Option<Self> {
        default_config_path().and_then(|path| load_optional(&path))
    }

    /// Load the override file at `path`, reporting errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config_file(path)
    }
}
