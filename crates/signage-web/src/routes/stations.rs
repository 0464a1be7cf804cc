//! Station listing and one-shot media lists.
//!
//! # Endpoints
//!
//! ### `GET /stations`
//! Returns every station with its selected-media count.
//!
//! ### `GET /stations/{id}/media`
//! Returns `{"media": [DisplayItem, ...]}` for the station; 404 when the
//! station does not exist.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::debug;

use signage_core::{MediaStore, StationId, StationSummary};
use signage_protocol::MediaListResponse;

use crate::error::ApiError;
use crate::AppState;

/// Create station routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stations))
        .route("/:id/media", get(station_media))
}

/// GET /stations
async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<StationSummary>>, ApiError> {
    let store = state.server.store();
    let stations = store.read().await.stations()?;
    Ok(Json(stations))
}

/// GET /stations/{id}/media
async fn station_media(
    State(state): State<AppState>,
    Path(station_id): Path<StationId>,
) -> Result<Json<MediaListResponse>, ApiError> {
    state.statistics.record_media_request();
    let list = state.server.resolver().media_list(station_id).await?;
    debug!(station_id, items = list.media.len(), "Served media list");
    Ok(Json(list))
}
