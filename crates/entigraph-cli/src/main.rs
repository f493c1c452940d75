//! Entigraph CLI - Command line interface for the entity graph

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod context;
mod output;

use commands::{completions, config as config_cmd, export, graph, list, serve};

#[derive(Parser)]
#[command(name = "entigraph")]
#[command(author, version, about = "Entity relationship graphs for Dataverse catalogs")]
pub struct Cli {
    /// Config file (default: <config dir>/entigraph/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Read the catalog from a JSON snapshot instead of Dataverse
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Dataverse environment URL
    #[arg(long, env = "DATAVERSE_RESOURCE_URL", global = true)]
    pub resource_url: Option<String>,

    /// OAuth authority URL
    #[arg(long, env = "DATAVERSE_AUTHORITY", global = true)]
    pub authority: Option<String>,

    /// OAuth client id
    #[arg(long, env = "DATAVERSE_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "DATAVERSE_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// OAuth scope (default: <resource url>/.default)
    #[arg(long, env = "DATAVERSE_SCOPE", global = true)]
    pub scope: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_file_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve(serve::ServeArgs),
    /// List curated entities
    Entities,
    /// List normalized relationships
    Relationships,
    /// Assemble and print the entity graph
    Graph(graph::GraphArgs),
    /// Write the entity graph to a file
    Export(export::ExportArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting entigraph CLI");

    match &cli.command {
        Commands::Serve(args) => serve::run(args, &cli).await?,
        Commands::Entities => list::run_entities(&cli).await?,
        Commands::Relationships => list::run_relationships(&cli).await?,
        Commands::Graph(args) => graph::run(args, &cli).await?,
        Commands::Export(args) => export::run(args, &cli).await?,
        Commands::Config(args) => config_cmd::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
