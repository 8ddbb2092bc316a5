use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use groupwatch::config::Config;
use groupwatch::fetch::HttpTransport;
use groupwatch::output::terminal;
use groupwatch::pipeline::Monitor;
use groupwatch::store::{JsonFileStore, MemoryStore, SnapshotStore};

/// groupwatch: activity snapshots for community groups.
///
/// Lists every open community group in the directory, collects activity
/// from the feeds, mailing lists, wikis and repositories each one declares,
/// and writes one snapshot file per group.
#[derive(Parser)]
#[command(name = "groupwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one monitoring pass and exit
    Run {
        /// Max requests in flight at once (default: GROUPWATCH_MAX_CONCURRENT or 8)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Max pages fetched per list walk (default: GROUPWATCH_MAX_PAGES or 200)
        #[arg(long)]
        max_pages: Option<usize>,

        /// Snapshot directory (default: GROUPWATCH_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Collect everything but keep snapshots in memory and print a preview
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what is in the snapshot directory
    Status {
        /// Snapshot directory (default: GROUPWATCH_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("groupwatch=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            concurrency,
            max_pages,
            data_dir,
            dry_run,
        } => {
            let mut config = Config::load()?;
            if let Some(concurrency) = concurrency {
                config.max_concurrent = concurrency;
            }
            if let Some(max_pages) = max_pages {
                config.max_pages = max_pages;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            config.require_directory()?;

            info!(
                concurrency = config.max_concurrent,
                max_pages = config.max_pages,
                data_dir = %config.data_dir.display(),
                dry_run,
                "Starting monitoring pass"
            );

            let transport = Arc::new(HttpTransport::new(config.request_timeout)?);

            if dry_run {
                let store = Arc::new(MemoryStore::new());
                let monitor = Monitor::from_config(
                    &config,
                    transport,
                    Arc::clone(&store) as Arc<dyn SnapshotStore>,
                )?;
                let summary = monitor.run().await?;
                terminal::display_run_summary(&summary, true);
                terminal::display_snapshot_table(&store.all().await);
            } else {
                let store = Arc::new(JsonFileStore::new(config.data_dir.clone()));
                let monitor = Monitor::from_config(&config, transport, store)?;
                let summary = monitor.run().await?;
                terminal::display_run_summary(&summary, false);
                println!("Snapshots written to {}", config.data_dir.display());
            }
        }

        Commands::Status { data_dir } => {
            let config = Config::load()?;
            let store = JsonFileStore::new(data_dir.unwrap_or(config.data_dir));
            groupwatch::status::show(&store)?;
        }
    }

    Ok(())
}
