//! Data preparation binary
//!
//! Reads the scraped players/transfers tables, cleans every career,
//! classifies difficulty, and rewrites the questions table the game
//! server selects from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gtp_common::config::GameConfig;
use gtp_common::db::init_database;

/// Command-line arguments for gtp-dp
#[derive(Parser, Debug)]
#[command(name = "gtp-dp")]
#[command(about = "Builds trivia questions from scraped transfer histories")]
#[command(version)]
struct Args {
    /// SQLite database holding scraped players/transfers tables
    #[arg(short, long, env = "GTP_DATABASE")]
    database: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long, env = "GTP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gtp_dp=info,gtp_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting GTP data preparation v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        GameConfig::resolve(args.config.as_deref()).context("Failed to resolve configuration")?;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!("Database: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let summary = gtp_dp::rebuild::rebuild_questions(&pool).await?;
    summary.log();

    Ok(())
}
