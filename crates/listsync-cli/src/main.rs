//! listsync CLI
//!
//! Command-line interface for listsync - collaborative to-do lists.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use listsync_core::ItemId;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "listsync")]
#[command(about = "listsync - collaborative to-do lists over a relay")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Relay {
        /// Listen address (overrides config)
        #[arg(long)]
        listen: Option<String>,
    },
    /// Add an item to the list
    Add {
        /// The to-do text
        text: String,
    },
    /// Remove an item by id
    #[command(alias = "remove")]
    Rm {
        /// Item id
        id: ItemId,
    },
    /// Move an item after another item (omit --after for end of list)
    Move {
        /// Item id to move
        id: ItemId,
        /// Id of the item it should follow
        #[arg(long)]
        after: Option<ItemId>,
    },
    /// Show the list
    #[command(alias = "ls")]
    List,
    /// Stay connected and show peer changes live
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, relay_url, sync_enabled, listen_addr)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Print the config file path
    Path,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("listsync_core=info,listsync=info"));
    // Logs go to stderr so --json output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match cli.command {
        Commands::Relay { listen } => commands::relay::run(listen, &output).await,
        Commands::Add { text } => commands::todo::add(text, &output).await,
        Commands::Rm { id } => commands::todo::remove(id, &output).await,
        Commands::Move { id, after } => commands::todo::relocate(id, after, &output).await,
        Commands::List => commands::todo::list(&output),
        Commands::Watch => commands::todo::watch(&output).await,
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, &output),
            Some(ConfigCommands::Path) => commands::config::path(),
        },
    }
}
