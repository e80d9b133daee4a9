pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use client::{AdminClient, ClientError};

#[derive(Parser)]
#[command(name = "adminctl")]
#[command(about = "adminctl - Command-line client for the Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "ADMIN_API_URL", default_value = "http://127.0.0.1:5000", help = "Server base URL")]
    pub server: String,

    #[arg(long, global = true, env = "ADMIN_API_TOKEN", hide_env_values = true, help = "Bearer token (Firebase ID token)")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Admin role management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Search institutions")]
    Search {
        #[arg(help = "Search query")]
        query: String,
    },

    #[command(about = "Check server health")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = AdminClient::new(&cli.server, cli.token.clone())?;

    match cli.command {
        Commands::Admin { cmd } => commands::admin::handle(&client, cmd, output_format).await,
        Commands::Search { query } => commands::search::handle(&client, &query, output_format).await,
        Commands::Health => commands::health::handle(&client, output_format).await,
    }
}
