#![deny(clippy::all)]

mod commands;
mod config;
mod destination;
mod dialog;
mod error;
mod graph;
mod importer;
mod keychain;
mod label;
mod otter;
mod outline;
mod preferences;
mod registry;
mod roam_date;
mod transcript;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export error types (used by other modules)
#[allow(unused_imports)]
pub use error::*;

/// Import Otter transcripts into a local notes graph
#[derive(Parser, Debug)]
#[command(name = "otter-import")]
#[command(version)]
struct Cli {
    /// Graph file to read and write
    #[arg(long, global = true, env = "OTTER_IMPORT_GRAPH")]
    graph: Option<PathBuf>,

    /// Preferences file
    #[arg(long, global = true, env = "OTTER_IMPORT_PREFERENCES")]
    preferences: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick a recording and import it in place of a block
    Dialog {
        /// Placeholder block to import at; removed once the dialog closes
        #[arg(long, conflicts_with = "parent")]
        block: Option<String>,
        /// Create the placeholder at the end of this block (default: today's page)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Import the latest recordings into the page containing a block
    Smartblock {
        #[arg(long)]
        block: String,
    },
    /// Import the latest recordings under a block (default: today's page)
    Sweep {
        #[arg(long)]
        parent: Option<String>,
    },
    /// Run the auto-import if it is enabled
    Startup,
    /// Print a recording's transcript
    Show {
        id: String,
        /// Group lines by speaker instead of using the template
        #[arg(long)]
        by_speaker: bool,
    },
    /// Save Otter account credentials
    Login {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored Otter password
    Logout,
    /// Show or change settings
    Settings(commands::SettingsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otter_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {:?}", path);
    }

    let cli = Cli::parse();

    // Load configuration from embedded config.toml
    let config = config::load_config().context("Failed to parse embedded config.toml")?;

    let store = match cli.preferences {
        Some(path) => preferences::PreferencesStore::at(path),
        None => preferences::PreferencesStore::default_location()?,
    };
    let graph_path = match cli.graph {
        Some(path) => path,
        None => preferences::app_config_dir()
            .ok_or(preferences::PreferencesError::NoConfigDir)?
            .join("graph.json"),
    };
    let graph = graph::LocalGraph::open(&graph_path)
        .with_context(|| format!("Failed to open graph {:?}", graph_path))?;
    info!(graph = ?graph.path(), preferences = ?store.path(), "Opened workspace");

    let ctx = commands::Context::new(config, store, graph);
    match cli.command {
        Command::Dialog { block, parent } => commands::run_dialog(&ctx, block, parent).await,
        Command::Smartblock { block } => commands::run_smartblock(&ctx, block).await,
        Command::Sweep { parent } => commands::run_sweep(&ctx, parent).await,
        Command::Startup => commands::run_startup(&ctx).await,
        Command::Show { id, by_speaker } => commands::run_show(&ctx, id, by_speaker).await,
        Command::Login { email } => commands::run_login(&ctx, email).await,
        Command::Logout => commands::run_logout(&ctx).await,
        Command::Settings(args) => commands::run_settings(&ctx, args).await,
    }
}
