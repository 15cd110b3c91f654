// server/src/cli/cli.rs
use anyhow::{Context, Result};
use clap::Parser;
use lib::{load_portal_config, Portal};
use log::info;
use logging_service::init_logging;
use super::commands::CliArgs;
use super::handlers::handle_command;

/// Parses arguments, loads config, starts logging and runs one command.
pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_portal_config(args.config.as_deref()).context("Failed to load portal config")?;
    init_logging(&config.logging.level, config.logging.file.as_deref())?;
    info!("Using backend {}", config.api.auth);

    let portal = Portal::from_config(config).await.context("Failed to start portal client")?;
    handle_command(&portal, args.command).await
}
