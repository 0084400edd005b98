pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "trackctl")]
#[command(about = "AppTrack CLI - read admin grids through the single-flight datasource")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Backend API host (overrides APPTRACK_API_HOST)")]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Persisted login session")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Persisted per-grid filter seeds")]
    Filter {
        #[command(subcommand)]
        cmd: commands::filter::FilterCommands,
    },

    #[command(about = "Admin grid reads")]
    Grid {
        #[command(subcommand)]
        cmd: commands::grid::GridCommands,
    },
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

    match cli.command {
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
        Commands::Filter { cmd } => commands::filter::handle(cmd, output_format).await,
        Commands::Grid { cmd } => commands::grid::handle(cmd, cli.host, output_format).await,
    }
}
