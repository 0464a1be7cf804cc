//! HTTP route handlers for the signage server.

pub mod slider;
pub mod stations;
pub mod stream;

use crate::statistics::ServerStatistics;
use crate::AppState;
use axum::{extract::State, response::Json, routing::get, Router};

/// Create the main Axum router with all routes.
///
/// Routes are organized as:
/// - `/` - Discovery
/// - `/health` - Liveness probe
/// - `/statistics` - Stream and request counters
/// - `/stations/` - Station listing, media lists, slider pages and streams
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(discovery_handler))
        .route("/health", get(health_handler))
        .route("/statistics", get(statistics_handler))
        .nest("/stations", station_routes())
        .with_state(state)
}

fn station_routes() -> Router<AppState> {
    Router::new()
        .merge(stations::routes())
        .merge(slider::routes())
        .merge(stream::routes())
}

/// Handler for `/` discovery endpoint.
async fn discovery_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.server.config();
    Json(serde_json::json!({
        "server": {
            "id": config.name,
            "version": env!("CARGO_PKG_VERSION")
        },
        "endpoints": {
            "stations": "/stations",
            "media": "/stations/{id}/media",
            "slider": "/stations/{id}/slider",
            "stream": "/stations/{id}/stream",
            "statistics": "/statistics",
            "health": "/health"
        },
        "mediaUrl": config.media_url,
        "pollIntervalSecs": config.poll_interval.as_secs()
    }))
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn statistics_handler(State(state): State<AppState>) -> Json<ServerStatistics> {
    let streams = state.server.registry().stats();
    Json(state.statistics.snapshot(streams))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::time::Duration;
    use tower::ServiceExt;

    use signage_core::{MemoryStore, Product, ProductMedia, Station};
    use signage_server::{ServerConfig, SignageServer};

    use crate::{AppState, ServerState};

    pub const TICK: Duration = Duration::from_secs(10);

    /// Station 1 "Lobby" showing ad1.jpg and ad2.mp4; station 2 "Hall" empty.
    pub fn lobby_state() -> AppState {
        let mut store = MemoryStore::new();
        store.insert_product(Product::new(1, "W100", "Widget")).unwrap();
        store.insert_product(Product::new(2, "G200|", "Gadget")).unwrap();
        store
            .insert_station(Station::new(1, "Lobby", "Lobby Display"))
            .unwrap();
        store
            .insert_station(Station::new(2, "Hall", "Hall <Display>"))
            .unwrap();
        store
            .insert_media(ProductMedia::new(1, 1, 1, "ad1.jpg", 5).selected())
            .unwrap();
        store
            .insert_media(ProductMedia::new(2, 2, 1, "ad2.mp4", 20).selected())
            .unwrap();
        store
            .insert_media(ProductMedia::new(3, 1, 1, "price list.pdf", 15))
            .unwrap();

        let config = ServerConfig {
            poll_interval: TICK,
            ..ServerConfig::default()
        };
        ServerState::new(SignageServer::new(config, store))
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
