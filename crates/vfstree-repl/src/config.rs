//! Console configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/vfstree/config.toml`:
//!
//! ```toml
//! url = "http://192.168.4.1"
//! timeout_secs = 10
//! history = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The address a device serves on in access-point mode.
pub const DEFAULT_URL: &str = "http://192.168.4.1";

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the device.
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Keep line history between sessions.
    #[serde(default = "default_history")]
    pub history: bool,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_history() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            history: default_history(),
        }
    }
}

impl ConsoleConfig {
    /// Load `path`, or the default config file if `None`.
    ///
    /// A missing default file gives the defaults; an explicitly named file
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::debug!("no config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `$XDG_CONFIG_HOME/vfstree/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vfstree").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// `$XDG_DATA_HOME/vfstree/history.txt`, if history is enabled.
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history {
            return None;
        }
        ProjectDirs::from("", "", "vfstree").map(|dirs| dirs.data_dir().join("history.txt"))
    }
}
