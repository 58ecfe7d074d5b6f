//! Config file discovery.
//!
//! The config lives at `~/.config/basecamp/config.toml` on Linux and
//! `~/Library/Application Support/basecamp/config.toml` on macOS. Set
//! `BASECAMP_CONFIG_DIR` to use another directory.

use std::path::{Path, PathBuf};

use crate::{BasecampConfig, ConfigError, Result};

/// Config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "basecamp";

/// Environment variable to override the config directory.
pub const CONFIG_DIR_ENV: &str = "BASECAMP_CONFIG_DIR";

/// Get the config directory for basecamp.
///
/// Checks `BASECAMP_CONFIG_DIR` first, then falls back to the platform
/// default.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the default config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Load the config.
///
/// An explicit `path` must exist. Without one, the default location is
/// used and a missing file yields an empty config. Environment overrides
/// are applied either way.
pub fn load_config(path: Option<&Path>) -> Result<BasecampConfig> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => match config_path() {
            Some(path) if path.is_file() => load_config_file(&path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                BasecampConfig::new()
            }
            None => BasecampConfig::new(),
        },
    };
    config.apply_env()?;
    Ok(config)
}

/// Load config from a specific file path (no discovery, no overrides).
pub fn load_config_file(path: &Path) -> Result<BasecampConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    BasecampConfig::from_toml(&contents)
}

/// Save configuration to a file.
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &BasecampConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
