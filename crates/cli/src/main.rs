//! goaltrack - personal goal tracker for the terminal.

use anyhow::Result;
use clap::Parser;

use goaltrack_client::ClientConfig;

mod commands;
mod context;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    goaltrack_observability::init(cli.log_format.unwrap_or(config.log_format));
    tracing::debug!(api_url = %config.api_url, data_dir = ?config.data_dir, "configuration loaded");

    cli.execute(config).await
}
