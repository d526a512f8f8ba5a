//! Target Tracker API - Main entry point
//!
//! Open-access CRUD service for analytical targets, indicator sources,
//! indicators and the weighted associations linking targets to indicators,
//! plus derived scoring and status promotion operations.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::ServiceExt;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracker_api::{build_app, AppState};

/// Command-line arguments for tracker-api
#[derive(Parser, Debug)]
#[command(name = "tracker-api")]
#[command(about = "Target tracking CRUD API service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "TRACKER_PORT")]
    port: u16,

    /// Path to the SQLite database file
    #[arg(short, long, default_value = "tracker.db", env = "TRACKER_DATABASE")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Target Tracker API v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", args.database.display());

    let pool = tracker_common::db::init_database(&args.database)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool);
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health/", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
