//! melo-ls - Lyrics Search microservice
//!
//! **Module Identity:**
//! - Name: melo-ls (Lyrics Search)
//! - Default port: 5730
//!
//! Turns a free-text lyric fragment or song name into ranked songs from the music
//! catalog, using Genius search as the metadata source.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use melo_common::config::LoggingConfig;
use melo_ls::clients::{GeniusClient, SaavnCatalogClient};
use melo_ls::config::{load_service_config, resolve_genius_access_token};
use melo_ls::search::lexicon::Lexicon;
use melo_ls::search::LyricsSearch;
use melo_ls::AppState;

/// Command-line arguments for melo-ls
#[derive(Parser, Debug)]
#[command(name = "melo-ls")]
#[command(about = "Lyrics search microservice for melo")]
#[command(version)]
struct Args {
    /// Path to melo-ls.toml
    #[arg(short, long, env = "MELO_LS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "MELO_LS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MELO_LS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs through a scoped subscriber until the configured level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(LoggingConfig::default().level)),
        )
        .finish();
    let (config_path, config) = tracing::subscriber::with_default(bootstrap, || {
        load_service_config(args.config.as_deref())
    })
    .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting melo-ls (Lyrics Search) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("Config: built-in defaults"),
    }

    let token = resolve_genius_access_token(&config.genius)?;
    let genius = GeniusClient::new(&config.genius.base_url, &token, config.genius.timeout())
        .context("Failed to create Genius client")?;
    let catalog = SaavnCatalogClient::new(&config.catalog.base_url, config.catalog.timeout())
        .context("Failed to create catalog client")?;
    info!("Metadata source: {}", config.genius.base_url);
    info!("Catalog source: {}", config.catalog.base_url);

    let search = LyricsSearch::new(
        Arc::new(genius),
        Arc::new(catalog),
        Lexicon::builtin(),
        config.search.clone(),
    );
    let app = melo_ls::build_router(AppState::new(search));

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
