mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{FavoritesCommands, FetchArgs, WatchArgs};

#[derive(Debug, Parser)]
#[command(name = "parkwatch-cli")]
#[command(about = "Nearby parking availability from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Acquire once and print ranked facilities
    Fetch(FetchArgs),
    /// Poll on an interval and print a line per facility each cycle
    Watch(WatchArgs),
    /// Manage favorite facilities
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = parkwatch_core::load_app_config()?;

    // Logs go to stderr so `fetch --json` output stays machine-readable.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch(args) => commands::run_fetch(&config, &args).await,
        Commands::Watch(args) => commands::run_watch(&config, &args).await,
        Commands::Favorites { command } => commands::run_favorites(&config, &command),
    }
}
