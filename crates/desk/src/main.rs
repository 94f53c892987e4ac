use std::sync::Arc;

use anyhow::Context;
use backend::{ApiClient, ClientConfig, FileSession};
use clap::Parser;
use tracing::{debug, warn};

use common::config::AppConfig;
use common::logger;

use crate::cli::Cli;

mod cli;
mod commands;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    logger::setup_logger();
    debug!("Backend at {}", config.api_url);

    let session = FileSession::open(&config.token_file).with_context(|| {
        format!("Failed to read session from {}", config.token_file.display())
    })?;

    let client = ApiClient::new(
        ClientConfig::new(config.api_url.clone()).with_timeout(config.request_timeout),
        Arc::new(session),
    )
    .context("Failed to build HTTP client")?
    .with_unauthorized_hook(Arc::new(|| {
        warn!("Session expired or rejected, run `desk login` to sign in again");
    }));

    commands::run(cli.command, client, &config).await
}
