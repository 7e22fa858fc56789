//! Directory service (hub-dir) - Main entry point
//!
//! Serves the Handy Hub business directory API: tier-ranked search,
//! entitlement-enforced listing writes, and the ownership claim flow.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hub_common::config;
use hub_dir::{build_router, db, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for hub-dir
#[derive(Parser, Debug)]
#[command(name = "hub-dir")]
#[command(about = "Directory service for Handy Hub")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "HANDYHUB_DIR_PORT")]
    port: u16,

    /// Data folder containing the directory database
    #[arg(short, long)]
    data_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hub_dir=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting Handy Hub Directory v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    // Resolve data folder: CLI > environment > config file > OS default
    let data_folder = config::resolve_data_folder(
        args.data_folder.as_deref().and_then(|p| p.to_str()),
        "HANDYHUB_DATA",
    );
    let db_path = config::database_path(&data_folder);
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("hub-dir listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
