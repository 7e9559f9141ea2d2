//! Guess The Player game server - main entry point
//!
//! Serves the career-sequence trivia API over HTTP. The question pool must
//! have been built beforehand by gtp-dp against the same database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gtp_common::config::GameConfig;
use gtp_common::db::init_database;
use gtp_gs::services::cleanup::start_cleanup_task;
use gtp_gs::{build_router, AppState};

/// Command-line arguments for gtp-gs
#[derive(Parser, Debug)]
#[command(name = "gtp-gs")]
#[command(about = "Guess The Player game server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GTP_PORT")]
    port: Option<u16>,

    /// Path to the SQLite database
    #[arg(short, long, env = "GTP_DATABASE")]
    database: Option<PathBuf>,

    /// Directory of cached images, served under /static
    #[arg(long, env = "GTP_STATIC_ROOT")]
    static_root: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, env = "GTP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gtp_gs=debug,gtp_common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting GTP game server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = GameConfig::resolve(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(static_root) = args.static_root {
        config.static_root = static_root;
    }

    info!("Database: {}", config.database_path.display());
    info!("Static root: {}", config.static_root.display());

    let db = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let state = AppState::new(db, config);
    let port = state.config.port;

    // Expired sessions are swept in the background, independent of requests.
    let cancel_token = CancellationToken::new();
    let sweeper = start_cleanup_task(
        Arc::clone(&state.sessions),
        state.config.cleanup_interval_secs,
        cancel_token.clone(),
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel_token.cancel();
    if let Err(e) = sweeper.await {
        error!("Cleanup task did not stop cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
