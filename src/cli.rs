//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "gridsync", version, about = "Terminal client for a remote spreadsheet")]
pub struct Args {
    /// Service base URL (omit to run against the in-process loopback)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Table id sent with every request
    #[arg(long, value_name = "ID")]
    pub table: Option<String>,

    /// Number of visible rows
    #[arg(long)]
    pub rows: Option<usize>,

    /// Number of visible columns
    #[arg(long)]
    pub cols: Option<usize>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Flags win over file values.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.remote.endpoint = Some(endpoint.clone());
        }
        if let Some(table) = &self.table {
            config.remote.table = Some(table.clone());
        }
        if let Some(rows) = self.rows {
            config.window.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.window.cols = cols;
        }
        if let Some(file) = &self.log_file {
            config.log.file = Some(file.clone());
        }
    }
}
