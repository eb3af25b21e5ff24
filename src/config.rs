//! User configuration (`config.toml`).
//!
//! Every key is optional. The file lives in the platform config directory
//! unless `--config` points elsewhere; command-line flags are applied on top
//! (see [`crate::cli::Args::apply_to`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use gridsync_core::{Window, WritePolicy};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Config files larger than this are refused.
pub const MAX_CONFIG_BYTES: u64 = 1024 * 1024;

/// Upper bound on `rows * cols`; the whole window is fetched on every reload.
pub const MAX_WINDOW_CELLS: usize = 1_000_000;

const APP_NAME: &str = "gridsync";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub remote: RemoteConfig,
    pub window: WindowConfig,
    pub sync: SyncConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Service base URL. Without one the client runs against the loopback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            table: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub rows: usize,
    pub cols: usize,
    pub col_width: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let window = Window::default();
        Self {
            rows: window.rows,
            cols: window.cols,
            col_width: 12,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub write_policy: WritePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::read(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Config> {
        let read_err = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(read_err)?.len();
        if size > MAX_CONFIG_BYTES {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_CONFIG_BYTES,
            });
        }

        let content = fs::read_to_string(path).map_err(read_err)?;
        Self::parse(&content, path)
    }

    /// Parse TOML text; `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Config> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.rows == 0 || self.window.cols == 0 {
            return Err(ConfigError::EmptyWindow {
                rows: self.window.rows,
                cols: self.window.cols,
            });
        }
        let cells = self.window.rows.checked_mul(self.window.cols);
        if cells.is_none_or(|cells| cells > MAX_WINDOW_CELLS) {
            return Err(ConfigError::WindowTooLarge {
                rows: self.window.rows,
                cols: self.window.cols,
                limit: MAX_WINDOW_CELLS,
            });
        }
        if self.window.col_width == 0 {
            return Err(ConfigError::ZeroColumnWidth);
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn window(&self) -> Window {
        Window::new(self.window.rows, self.window.cols)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    /// Log file from config, falling back to the platform cache directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.clone().or_else(|| {
            let proj = ProjectDirs::from("", "", APP_NAME)?;
            Some(proj.cache_dir().join("gridsync.log"))
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", APP_NAME)?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
