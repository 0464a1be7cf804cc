//! Server-push station streams.
//!
//! ### `GET /stations/{id}/stream`
//! A persistent `text/event-stream` response. Each event is a
//! `data: {"media": [...], "screen_name": "..."}` block, sent when the
//! station's playlist first resolves and then only when it changes.
//!
//! An unknown station is rejected with 404 before the stream starts. A
//! station deleted while the stream is open ends the stream with one
//! `event: error` carrying `{"error": ..., "code": "NOT_FOUND"}`.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::{Path, State},
    http::{header, HeaderName},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use signage_core::{MediaStore, StationId};
use signage_protocol::{
    encode_stream_error, encode_update, StreamErrorMessage, EVENT_STREAM_CONTENT_TYPE,
};
use signage_server::StreamError;

use crate::error::ApiError;
use crate::AppState;

/// Create stream routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/stream", get(station_stream))
}

/// GET /stations/{id}/stream
async fn station_stream(
    State(state): State<AppState>,
    Path(station_id): Path<StationId>,
) -> Result<Response, ApiError> {
    {
        let store = state.server.store();
        let store = store.read().await;
        store.station(station_id)?;
    }

    let mut updates = state.server.open_stream(station_id);
    let stream_id = updates.id();
    info!(stream_id, station_id, "Stream client connected");

    let events = stream! {
        while let Some(item) = updates.next().await {
            match item {
                Ok(update) => match encode_update(&update) {
                    Ok(json) => yield Ok::<_, Infallible>(Event::default().data(json)),
                    Err(e) => error!(stream_id, station_id, "Failed to encode update: {}", e),
                },
                Err(err @ StreamError::StationGone(_)) => {
                    let message = StreamErrorMessage::not_found(err.to_string());
                    match encode_stream_error(&message) {
                        Ok(json) => yield Ok(Event::default().event("error").data(json)),
                        Err(e) => error!(stream_id, station_id, "Failed to encode stream error: {}", e),
                    }
                }
            }
        }
        debug!(stream_id, station_id, "Stream closed");
    };

    let headers = [
        (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
        (header::CACHE_CONTROL, "no-cache"),
        (HeaderName::from_static("x-accel-buffering"), "no"),
    ];
    Ok((headers, Sse::new(events).keep_alive(KeepAlive::default())).into_response())
}
