//! fbk-ai - Feedback Analysis Service
//!
//! **Module Identity:**
//! - Name: fbk-ai
//! - Port: 5730 (default)
//!
//! Accepts customer feedback over HTTP, classifies it through a hosted
//! language model, stores every record in SQLite and summarizes the most
//! recent entries on demand.

use anyhow::{Context, Result};
use clap::Parser;
use fbk_common::config::{RootFolderInitializer, RootFolderResolver};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use fbk_ai::db::SqliteFeedbackStore;
use fbk_ai::services::WorkersAiGateway;
use fbk_ai::{AppState, ServiceSettings};

/// Command-line arguments for fbk-ai
#[derive(Parser, Debug)]
#[command(name = "fbk-ai")]
#[command(about = "Customer feedback analysis service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "FBK_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(long)]
    host: Option<String>,

    /// Root folder holding the database (overrides config file)
    #[arg(short, long, env = "FBK_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new("fbk-ai");
    let mut config = resolver.load_config();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fbk_ai={0},fbk_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .init();

    // Build identification first, before any database work
    info!(
        "Starting fbk-ai v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = args.root_folder.unwrap_or_else(|| resolver.resolve());
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    if !initializer.database_exists() {
        info!("Creating new database: {}", db_path.display());
    }
    let pool = fbk_common::db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database: {}", db_path.display());

    config.llm.apply_env_overrides();
    let gateway = WorkersAiGateway::from_config(&config.llm)
        .context("Language model gateway is not configured")?;
    let settings = ServiceSettings::from_config(&config)?;
    info!(
        analysis_model = %settings.analysis_model,
        summary_model = %settings.summary_model,
        summary_window = settings.summary_window.get(),
        "Gateway ready"
    );

    let store = Arc::new(SqliteFeedbackStore::new(pool.clone()));
    let state = AppState::new(store, Arc::new(gateway), &settings);
    let app = fbk_ai::build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
