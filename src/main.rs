//! Bughouse - Unified CLI
//!
//! Terminal client and room relay server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use bughouse::{ClientConfig, RelayServer, run_client};
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            server_url,
            room,
            bank_authority,
        } => {
            let config = load_client_config(&config, server_url, room, bank_authority)?;
            run_client(config).await
        }
        Command::Serve { port, host } => run_server(host, port).await,
    }
}

/// Run the room relay server
async fn run_server(host: String, port: u16) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(%host, port, "Starting bughouse room server");
    RelayServer::new().serve(&host, port).await
}

/// Loads the config file (or defaults) and applies command-line overrides.
#[instrument(skip(config_path))]
fn load_client_config(
    config_path: &std::path::Path,
    server_url: Option<String>,
    room: Option<String>,
    bank_authority: Option<bughouse::BankAuthority>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::load_or_default(config_path)?;

    if let Some(url) = server_url {
        config = config.with_server_url(url);
    }
    if let Some(room) = room {
        config = config.with_room(room);
    }
    if let Some(authority) = bank_authority {
        config = config.with_bank_authority(authority);
    }
    Ok(config)
}
