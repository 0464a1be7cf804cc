//! Selection resolution.
//!
//! A [`Resolution`] is the result of one store read for one station. Both the
//! client payload and the comparison snapshot are derived from it, so the
//! message that is sent always matches the snapshot that triggered it.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use signage_core::{
    MediaId, MediaRow, MediaStore, MediaUrlBuilder, StationId, StationSummary, StoreError,
};
use signage_protocol::{DisplayItem, MediaListResponse, MediaUpdate};

/// Errors returned by [`SelectionResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("station {0} not found")]
    NotFound(StationId),

    /// Store failure other than a missing station; usually transient.
    #[error(transparent)]
    Store(StoreError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound(_))
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StationNotFound(id) => ResolveError::NotFound(id),
            other => ResolveError::Store(other),
        }
    }
}

/// One entry of the comparison snapshot.
///
/// Carries the raw file reference instead of the resolved URL and no type tag:
/// those are derived from the file and cannot change independently of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub media_id: MediaId,
    pub file: String,
    pub duration: u32,
    pub product_name: String,
    pub product_code: String,
}

/// Ordered comparison form of a station's displayable media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A station and its displayable media, read in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub station: StationSummary,
    pub rows: Vec<MediaRow>,
}

impl Resolution {
    /// Client representation of every row, in resolution order.
    pub fn display_items(&self, urls: &MediaUrlBuilder) -> Vec<DisplayItem> {
        self.rows
            .iter()
            .map(|row| DisplayItem::from_row(row, urls))
            .collect()
    }

    /// Comparison representation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self
                .rows
                .iter()
                .map(|row| SnapshotEntry {
                    media_id: row.id,
                    file: row.file.clone(),
                    duration: row.duration,
                    product_name: row.product_name.clone(),
                    product_code: row.product_code.clone(),
                })
                .collect(),
        }
    }

    /// Stream payload: display items plus the station's screen name.
    pub fn update(&self, urls: &MediaUrlBuilder) -> MediaUpdate {
        MediaUpdate {
            media: self.display_items(urls),
            screen_name: self.station.screen_name.clone(),
        }
    }
}

/// Computes the displayable media of stations.
pub struct SelectionResolver<S> {
    store: Arc<RwLock<S>>,
    urls: MediaUrlBuilder,
}

impl<S> Clone for SelectionResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            urls: self.urls.clone(),
        }
    }
}

impl<S: MediaStore> SelectionResolver<S> {
    pub fn new(store: Arc<RwLock<S>>, urls: MediaUrlBuilder) -> Self {
        Self { store, urls }
    }

    pub fn urls(&self) -> &MediaUrlBuilder {
        &self.urls
    }

    pub fn store(&self) -> &Arc<RwLock<S>> {
        &self.store
    }

    /// Read a station and its active+selected media.
    ///
    /// Media come back in ascending id order. A missing station is
    /// [`ResolveError::NotFound`], never an empty list.
    pub async fn resolve(&self, station_id: StationId) -> Result<Resolution, ResolveError> {
        let store = self.store.read().await;
        let station = store.station(station_id)?;
        let rows = store.displayable_media(station_id)?;
        Ok(Resolution { station, rows })
    }

    /// One-shot media list for a station.
    pub async fn media_list(&self, station_id: StationId) -> Result<MediaListResponse, ResolveError> {
        let resolution = self.resolve(station_id).await?;
        Ok(MediaListResponse {
            media: resolution.display_items(&self.urls),
        })
    }
}
