use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use websession_core::{DefaultHeaders, RestAuthClient, RestConfig, SessionCoordinator};

mod app_context;
mod cli_args;
mod commands;

use crate::app_context::LoggingAppContext;
use crate::cli_args::{Cli, Command};
use crate::commands::{handle_call, handle_check, handle_login};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = load_config(&cli)?;

    let headers = DefaultHeaders::new();
    let client = Arc::new(RestAuthClient::new(config, headers.clone())?);
    let coordinator = Arc::new(SessionCoordinator::new(
        client.clone(),
        Arc::new(LoggingAppContext),
        headers,
    ));

    match cli.command {
        Command::Login(args) => handle_login(args, &coordinator).await?,
        Command::Check => handle_check(&coordinator).await?,
        Command::Call(args) => handle_call(args, &coordinator, &client).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<RestConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => RestConfig::load(path)?,
        None => RestConfig::default(),
    };
    if let Some(addr) = cli.addr.as_deref() {
        config.base_url = addr.to_string();
    }
    if cli.insecure {
        config.accept_invalid_certs = true;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
