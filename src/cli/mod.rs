//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions. Running
//! without a subcommand starts the server.

pub mod config;
pub mod geocode;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Vietnamese café recommendation chat with a live map
#[derive(Parser)]
#[command(name = "cafe-scout")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub serve: serve::ServeArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground, the default)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show how an address is geocoded
    Geocode(geocode::GeocodeArgs),
}

/// Initialize logging, defaulting to `info`
pub(crate) fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => serve::run(cli.serve).await,
        Some(Commands::Serve(args)) => serve::run(args).await,
        Some(Commands::Config(args)) => config::run(args),
        Some(Commands::Geocode(args)) => geocode::run(args).await,
    }
}
