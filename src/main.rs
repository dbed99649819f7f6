use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toplists::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "toplists",
    version,
    about = "Athletics all-time toplist scraper and ranking pipeline",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: scrape, combine, split (default)
    Run {
        /// Skip toplists whose output file already exists
        #[arg(long, default_value = "false")]
        skip_existing: bool,
    },

    /// Scrape every toplist in the discipline mapping
    Scrape {
        /// Skip toplists whose output file already exists
        #[arg(long, default_value = "false")]
        skip_existing: bool,
    },

    /// Combine per-job files per discipline and merge them into one dataset
    Combine,

    /// Split the merged dataset by relay/individual, type and discipline
    Split,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("toplists starting");

    match cli.command.unwrap_or(Commands::Run {
        skip_existing: false,
    }) {
        Commands::Run { skip_existing } => {
            config.scraper.skip_existing |= skip_existing;
            tracing::info!(
                workers = config.scraper.workers,
                skip_existing = config.scraper.skip_existing,
                "Starting full pipeline"
            );
            commands::scrape(&config).await?;
            commands::combine(&config)?;
            commands::split(&config)?;
        }

        Commands::Scrape { skip_existing } => {
            config.scraper.skip_existing |= skip_existing;
            tracing::info!(
                workers = config.scraper.workers,
                skip_existing = config.scraper.skip_existing,
                "Starting scrape command"
            );
            commands::scrape(&config).await?;
        }

        Commands::Combine => {
            tracing::info!(
                scrape_root = %config.paths.scrape_root.display(),
                "Starting combine command"
            );
            commands::combine(&config)?;
        }

        Commands::Split => {
            tracing::info!(
                datasets_dir = %config.paths.datasets_dir.display(),
                "Starting split command"
            );
            commands::split(&config)?;
        }
    }

    tracing::info!("toplists completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("toplists=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("toplists={level},warn"))?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
