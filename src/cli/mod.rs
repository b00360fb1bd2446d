pub mod client;
pub mod commands;
pub mod session;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;
use session::Session;

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Student panel CLI - command-line client for the school administration API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication, onboarding and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "School records (super_admin for writes)")]
    Schools {
        #[command(subcommand)]
        cmd: commands::schools::SchoolCommands,
    },

    #[command(about = "Student records, stats and leaderboard")]
    Students {
        #[command(subcommand)]
        cmd: commands::students::StudentCommands,
    },

    #[command(about = "Raw collection access (super_admin)")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Check that the API is up")]
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

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Schools { cmd } => commands::schools::handle(cmd, output_format).await,
        Commands::Students { cmd } => commands::students::handle(cmd, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::Health => health(output_format).await,
    };

    if let Err(e) = &result {
        if session::forget_rejected_token(&session::config_dir()?, e)? {
            tracing::info!("Stored token rejected; run `panel auth login` again");
        }
    }

    result
}

async fn health(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_session(&Session::load()?);
    let status = client.get("/health").await?;
    utils::output_value(&output_format, &status)
}
