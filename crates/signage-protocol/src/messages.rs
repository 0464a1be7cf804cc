//! Protocol message types.
//!
//! This module defines the messages a station receives:
//! - One-shot responses: `MediaListResponse`
//! - Stream events: `MediaUpdate`, `StreamErrorMessage`
//!
//! All messages are JSON objects.

use serde::{Deserialize, Serialize};
use signage_core::{media_type_tag, MediaId, MediaRow, MediaUrlBuilder};

/// One entry of a station playlist, as the client sees it.
///
/// # Example
/// ```json
/// {
///   "id": 1,
///   "url": "/media/ad1.jpg",
///   "type": "jpg",
///   "duration": 5,
///   "product_name": "Widget",
///   "product_code": "W100"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub id: MediaId,
    pub url: String,
    /// Lowercased file extension, empty when the file has none.
    #[serde(rename = "type")]
    pub media_type: String,
    /// Display duration in seconds.
    pub duration: u32,
    pub product_name: String,
    pub product_code: String,
}

impl DisplayItem {
    /// Build the client representation of a resolved media row.
    pub fn from_row(row: &MediaRow, urls: &MediaUrlBuilder) -> Self {
        Self {
            id: row.id,
            url: urls.url(&row.file),
            media_type: media_type_tag(&row.file),
            duration: row.duration,
            product_name: row.product_name.clone(),
            product_code: row.product_code.clone(),
        }
    }
}

/// Body of `GET /stations/{id}/media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaListResponse {
    pub media: Vec<DisplayItem>,
}

/// Payload of one stream event, sent whenever a station's playlist changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpdate {
    pub media: Vec<DisplayItem>,
    pub screen_name: String,
}

/// Final event of a stream that ended on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamErrorMessage {
    pub error: String,
    pub code: String,
}

impl StreamErrorMessage {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }
}
