//! TOML configuration for the `devlayout` tool.
//!
//! Read from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\DevLayout\config.toml`
//! - Linux:    `~/.config/devlayout/config.toml`
//! - macOS:    `~/Library/Application Support/DevLayout/config.toml`
//!
//! ```toml
//! log_level = "debug"
//! layouts_dir = "/home/me/layouts"
//! pretty = false
//! ```
//!
//! Every field is optional.  The tool only reads this file; it never writes it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Tool configuration stored on disk.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToolConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory searched for archive names that are not existing paths.
    #[serde(default)]
    pub layouts_dir: Option<PathBuf>,
    /// Whether archives written by the tool are pretty-printed.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            layouts_dir: None,
            pretty: default_true(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the tool configuration.
///
/// With `explicit = Some(path)` that file must exist.  Otherwise the default
/// location is used and a missing file yields [`ToolConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = config_file_path()?;
    match read_config(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(ToolConfig::default())
        }
        other => other,
    }
}

fn read_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Resolves the platform config directory including the `devlayout` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("DevLayout"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("devlayout"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("DevLayout")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
