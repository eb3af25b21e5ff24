//! Error types for the gridsync binary

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file {path} is too large ({size} bytes, limit {limit})")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("window must have at least one row and one column (got {rows}x{cols})")]
    EmptyWindow { rows: usize, cols: usize },

    #[error("window of {rows}x{cols} exceeds the limit of {limit} cells")]
    WindowTooLarge {
        rows: usize,
        cols: usize,
        limit: usize,
    },

    #[error("column width must be at least 1")]
    ZeroColumnWidth,

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
