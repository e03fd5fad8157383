//! Command-line interface for bughouse.

use bughouse_core::BankAuthority;
use clap::{Parser, Subcommand};

/// Bughouse - four-player, two-board chess over WebSockets
#[derive(Parser, Debug)]
#[command(name = "bughouse")]
#[command(about = "Terminal bughouse client and room server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the terminal client
    Play {
        /// Path to the client config file (defaults are used if it is missing)
        #[arg(short, long, default_value = "bughouse.toml")]
        config: std::path::PathBuf,

        /// Room server URL, overriding the config file
        #[arg(long)]
        server_url: Option<String>,

        /// Room to join on connect, overriding the config file
        #[arg(long)]
        room: Option<String>,

        /// Bank crediting path (event or capture), overriding the config file
        #[arg(long, value_parser = parse_authority)]
        bank_authority: Option<BankAuthority>,
    },

    /// Run the room relay server
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "8765")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn parse_authority(value: &str) -> Result<BankAuthority, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "event" => Ok(BankAuthority::Event),
        "capture" => Ok(BankAuthority::Capture),
        other => Err(format!("expected `event` or `capture`, got `{other}`")),
    }
}
