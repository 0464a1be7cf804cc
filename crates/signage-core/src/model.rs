//! Signage data model types.
//!
//! These types mirror the records managed by the administration side:
//! - Stations (display screens) and the products assigned to them
//! - Product media assets scoped to one station
//! - Linewise groupings that push one product to many stations
//!
//! Relations are stored as id sets; ordering inside them carries no meaning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type StationId = i64;
pub type ProductId = i64;
pub type MediaId = i64;
pub type LinewiseId = i64;

/// A physical display endpoint with its own playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,

    /// Internal name used by administrators.
    pub name: String,

    /// Name shown to viewers on the screen itself.
    pub screen_name: String,

    /// Owning manager (username), referenced not owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    /// Products assigned to this station.
    #[serde(default)]
    pub products: BTreeSet<ProductId>,

    /// Media explicitly selected for this station.
    #[serde(default)]
    pub selected_media: BTreeSet<MediaId>,
}

impl Station {
    /// Create a station with no products and no selection.
    pub fn new(id: StationId, name: &str, screen_name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            screen_name: screen_name.to_string(),
            manager: None,
            products: BTreeSet::new(),
            selected_media: BTreeSet::new(),
        }
    }
}

/// A catalog item owning zero or more media records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub name: String,
}

impl Product {
    pub fn new(id: ProductId, code: &str, name: &str) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// A single media asset belonging to one product and scoped to one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMedia {
    pub id: MediaId,
    pub product_id: ProductId,
    pub station_id: StationId,

    /// Stored file reference (relative to the media root), e.g. "products/ad1.jpg".
    pub file: String,

    /// Display duration in seconds.
    pub duration: u32,

    /// False once the asset is soft-deleted.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// True while the asset is part of the station's live playlist.
    #[serde(default)]
    pub is_selected: bool,
}

fn default_true() -> bool {
    true
}

impl ProductMedia {
    /// Create an active, unselected media record.
    pub fn new(
        id: MediaId,
        product_id: ProductId,
        station_id: StationId,
        file: &str,
        duration: u32,
    ) -> Self {
        Self {
            id,
            product_id,
            station_id,
            file: file.to_string(),
            duration,
            is_active: true,
            is_selected: false,
        }
    }

    /// Mark the record as selected (builder style, mostly for fixtures).
    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }

    /// A record is displayable only when it is both active and selected.
    pub fn is_displayable(&self) -> bool {
        self.is_active && self.is_selected
    }
}

/// Groups one product with a set of stations.
///
/// Saving a linewise pushes its product to every listed station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Linewise {
    pub id: LinewiseId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub stations: BTreeSet<StationId>,
}

/// Station fields needed by readers (no relations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    pub id: StationId,
    pub name: String,
    pub screen_name: String,
    pub selected_media_count: usize,
}

/// An active+selected media record joined with its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRow {
    pub id: MediaId,
    pub file: String,
    pub duration: u32,
    pub product_name: String,
    pub product_code: String,
}

/// Serialized form of a whole store, used for seeding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub media: Vec<ProductMedia>,
    #[serde(default)]
    pub linewises: Vec<Linewise>,
}
