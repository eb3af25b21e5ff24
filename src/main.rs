//! gridsync - terminal client for a remote, server-evaluated spreadsheet

mod cli;
mod config;
mod error;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gridsync_core::{EditSession, GridStore};
use gridsync_remote::RemoteGateway;
use tracing::info;

use crate::cli::Args;
use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    logging::init(config.log_file().as_deref(), &config.log.filter)?;

    let gateway = RemoteGateway::connect(config.remote.endpoint.as_deref(), config.timeout())
        .context("failed to set up the remote gateway")?;
    let remote_label = gateway.describe();
    info!(remote = %remote_label, window = ?config.window(), "starting");

    let mut store = GridStore::new(gateway, config.window()).with_policy(config.sync.write_policy);
    if let Some(table) = &config.remote.table {
        store = store.with_table(table.clone());
    }
    let session = EditSession::new(Arc::new(store));

    run(session, &config, remote_label).await
}

#[cfg(feature = "tui")]
async fn run(
    session: EditSession<RemoteGateway>,
    config: &Config,
    remote_label: String,
) -> anyhow::Result<()> {
    let mut app = tui::App::new(session, config.window.col_width, remote_label);
    tui::run(&mut app).await
}

#[cfg(not(feature = "tui"))]
async fn run(
    _session: EditSession<RemoteGateway>,
    _config: &Config,
    _remote_label: String,
) -> anyhow::Result<()> {
    anyhow::bail!("gridsync was built without the `tui` feature")
}
