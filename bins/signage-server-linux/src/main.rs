use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use signage_core::{Dataset, FileConfigStorage, MediaStore, MemoryStore};
use signage_server::{ServerConfig, SignageServer};
use signage_web::{create_router, ServerState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SETTINGS_ENV: &str = "SIGNAGE_SETTINGS";
const DEFAULT_SETTINGS_PATH: &str = "./settings.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,signage_server=debug,signage_web=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Signage server starting...");

    // Configuration
    let settings_path =
        std::env::var(SETTINGS_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    let storage = FileConfigStorage::new(&settings_path);
    let settings = storage
        .load_or_default()
        .with_context(|| format!("loading settings from {}", settings_path))?;

    let addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr()))?;

    let store = match &settings.seed_file {
        Some(path) => load_seed(path)?,
        None => {
            tracing::warn!("No seed file configured, starting with an empty store");
            MemoryStore::new()
        }
    };

    let config = ServerConfig::from_settings(&settings);
    tracing::info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        media_url = %config.media_url,
        "Server configured"
    );

    let server = SignageServer::new(config, store);
    let state = ServerState::new(server.clone());
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Signage server ready!");
    tracing::info!("   Stations:  http://{}/stations", addr);
    tracing::info!("   Media:     http://{}/stations/{{id}}/media", addr);
    tracing::info!("   Slider:    http://{}/stations/{{id}}/slider", addr);
    tracing::info!("   Stream:    http://{}/stations/{{id}}/stream", addr);

    // Open streams never finish on their own, so stop them before the
    // server waits for in-flight responses.
    let streams = server.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Received Ctrl+C, shutting down...");
            streams.shutdown().await;
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load the initial store contents from a JSON dataset.
fn load_seed(path: &Path) -> anyhow::Result<MemoryStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&content)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    let store = MemoryStore::from_dataset(dataset)
        .with_context(|| format!("loading seed file {}", path.display()))?;

    tracing::info!(
        stations = store.stations()?.len(),
        "Loaded seed data from {}",
        path.display()
    );
    Ok(store)
}
