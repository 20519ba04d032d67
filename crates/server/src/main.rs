use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tuneforge_core::{
    load_config, validate_config, Config, GenerationService, HistoryStore, LibraryBackend,
    LlmSuggestionGenerator, LoggingConfig, PlexBackend, SqliteHistoryStore, SubsonicBackend,
    SuggestionGenerator,
};
use tuneforge_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Enabled library backends. Missing details are checked per run.
fn build_backends(config: &Config) -> Vec<Arc<dyn LibraryBackend>> {
    let mut backends: Vec<Arc<dyn LibraryBackend>> = Vec::new();

    if config.navidrome.enabled {
        if !config.navidrome.is_complete() {
            warn!("Navidrome enabled but URL, username or password missing");
        }
        info!(url = ?config.navidrome.url, "Navidrome backend enabled");
        backends.push(Arc::new(SubsonicBackend::from_config(&config.navidrome)));
    }

    if config.plex.enabled {
        if !config.plex.is_complete() {
            warn!("Plex enabled but server URL, token, machine ID or music section missing");
        }
        info!(url = ?config.plex.server_url, "Plex backend enabled");
        backends.push(Arc::new(PlexBackend::from_config(&config.plex)));
    }

    if backends.is_empty() {
        warn!("No library backend enabled, generation requests will be rejected");
    }
    backends
}

fn build_generator(config: &Config) -> Option<Arc<dyn SuggestionGenerator>> {
    match &config.generator {
        Some(generator) => {
            info!(url = %generator.url, model = %generator.model, "Initializing Ollama generator");
            Some(Arc::new(LlmSuggestionGenerator::ollama(
                generator,
                config.preferences.clone(),
            )))
        }
        None => {
            warn!("No generator configured, generation requests will be rejected");
            None
        }
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("TUNEFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);
    info!("Configuration loaded from {:?}", config_path);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite history store
    let history: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistoryStore::new(&config.database.path)
            .context("Failed to create history store")?,
    );
    info!("History store initialized");

    let generation = GenerationService::new(
        config.orchestrator.clone(),
        build_generator(&config),
        build_backends(&config),
        Arc::clone(&history),
    );

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, generation, history));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
