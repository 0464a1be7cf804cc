//! Signage data store.
//!
//! The store holds stations, products, media records and linewise groupings,
//! and answers the queries the selection resolver needs.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::media::validate_media_file;
use crate::model::{
    Dataset, Linewise, LinewiseId, MediaId, MediaRow, Product, ProductId, ProductMedia, Station,
    StationId, StationSummary,
};

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("media {0} not found")]
    MediaNotFound(MediaId),

    /// The backing storage could not be read; the caller may retry later.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::StationNotFound(_)
                | StoreError::ProductNotFound(_)
                | StoreError::MediaNotFound(_)
        )
    }
}

/// Read-side query interface used by the resolver and the web layer.
pub trait MediaStore: Send + Sync {
    /// Look up a station.
    fn station(&self, id: StationId) -> Result<StationSummary, StoreError>;

    /// Active and selected media of a station, joined with product name/code,
    /// in ascending media id order.
    fn displayable_media(&self, station_id: StationId) -> Result<Vec<MediaRow>, StoreError>;

    /// All stations in ascending id order.
    fn stations(&self) -> Result<Vec<StationSummary>, StoreError>;
}

/// In-memory store implementation.
///
/// Records are kept in id-ordered maps, so every listing is ordered by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stations: BTreeMap<StationId, Station>,
    products: BTreeMap<ProductId, Product>,
    media: BTreeMap<MediaId, ProductMedia>,
    linewises: BTreeMap<LinewiseId, Linewise>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a dataset.
    ///
    /// Records are inserted as given: each station keeps exactly the
    /// selected-media relation listed in the dataset, and linewise groupings
    /// are stored without re-running their synchronisation. Every id in a
    /// station's relation must name one of that station's media.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for product in dataset.products {
            store.insert_product(product)?;
        }

        let mut relations = Vec::with_capacity(dataset.stations.len());
        for mut station in dataset.stations {
            let selected = std::mem::take(&mut station.selected_media);
            relations.push((station.id, selected));
            store.insert_station(station)?;
        }
        for media in dataset.media {
            store.check_media(&media)?;
            store.media.insert(media.id, media);
        }
        for (station_id, selected) in relations {
            let ids: Vec<MediaId> = selected.iter().copied().collect();
            store.check_selection(station_id, &ids)?;
            if let Some(station) = store.stations.get_mut(&station_id) {
                station.selected_media = selected;
            }
        }

        for linewise in dataset.linewises {
            store.check_linewise(&linewise)?;
            store.linewises.insert(linewise.id, linewise);
        }
        Ok(store)
    }

    /// Export the whole store.
    pub fn dataset(&self) -> Dataset {
        Dataset {
            stations: self.stations.values().cloned().collect(),
            products: self.products.values().cloned().collect(),
            media: self.media.values().cloned().collect(),
            linewises: self.linewises.values().cloned().collect(),
        }
    }

    pub fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        if self.products.contains_key(&product.id) {
            return Err(StoreError::InvalidData(format!(
                "duplicate product id {}",
                product.id
            )));
        }
        if self.products.values().any(|p| p.code == product.code) {
            return Err(StoreError::InvalidData(format!(
                "duplicate product code '{}'",
                product.code
            )));
        }
        self.products.insert(product.id, product);
        Ok(())
    }

    pub fn insert_station(&mut self, station: Station) -> Result<(), StoreError> {
        if self.stations.contains_key(&station.id) {
            return Err(StoreError::InvalidData(format!(
                "duplicate station id {}",
                station.id
            )));
        }
        if let Some(missing) = station
            .products
            .iter()
            .find(|id| !self.products.contains_key(*id))
        {
            return Err(StoreError::ProductNotFound(*missing));
        }
        let selected: Vec<MediaId> = station.selected_media.iter().copied().collect();
        self.check_selection(station.id, &selected)?;
        self.stations.insert(station.id, station);
        Ok(())
    }

    /// Insert a media record.
    ///
    /// The owning product and station must exist and the file must pass the
    /// extension policy. A record inserted as selected also joins the
    /// station's selected-media relation.
    pub fn insert_media(&mut self, media: ProductMedia) -> Result<(), StoreError> {
        self.check_media(&media)?;

        if media.is_selected {
            if let Some(station) = self.stations.get_mut(&media.station_id) {
                station.selected_media.insert(media.id);
            }
        }
        self.media.insert(media.id, media);
        Ok(())
    }

    fn check_media(&self, media: &ProductMedia) -> Result<(), StoreError> {
        if self.media.contains_key(&media.id) {
            return Err(StoreError::InvalidData(format!(
                "duplicate media id {}",
                media.id
            )));
        }
        if !self.products.contains_key(&media.product_id) {
            return Err(StoreError::ProductNotFound(media.product_id));
        }
        if !self.stations.contains_key(&media.station_id) {
            return Err(StoreError::StationNotFound(media.station_id));
        }
        validate_media_file(&media.file)
    }

    /// Soft-delete or restore a media record.
    pub fn set_media_active(&mut self, id: MediaId, active: bool) -> Result<(), StoreError> {
        let media = self.media.get_mut(&id).ok_or(StoreError::MediaNotFound(id))?;
        media.is_active = active;
        Ok(())
    }

    /// Toggle the selected flag of one record, keeping the station relation in step.
    pub fn set_media_selected(&mut self, id: MediaId, selected: bool) -> Result<(), StoreError> {
        let media = self.media.get_mut(&id).ok_or(StoreError::MediaNotFound(id))?;
        media.is_selected = selected;

        if let Some(station) = self.stations.get_mut(&media.station_id) {
            if selected {
                station.selected_media.insert(id);
            } else {
                station.selected_media.remove(&id);
            }
        }
        Ok(())
    }

    /// Replace a station's selection with exactly `media_ids`.
    ///
    /// Listed records are flagged selected; the station's other records are
    /// unflagged. Every id must belong to the station.
    pub fn select_media(
        &mut self,
        station_id: StationId,
        media_ids: &[MediaId],
    ) -> Result<(), StoreError> {
        if !self.stations.contains_key(&station_id) {
            return Err(StoreError::StationNotFound(station_id));
        }
        self.check_selection(station_id, media_ids)?;

        for media in self.media.values_mut().filter(|m| m.station_id == station_id) {
            media.is_selected = media_ids.contains(&media.id);
        }
        if let Some(station) = self.stations.get_mut(&station_id) {
            station.selected_media = media_ids.iter().copied().collect();
        }
        Ok(())
    }

    /// Delete a media record and drop it from its station's selection.
    pub fn remove_media(&mut self, id: MediaId) -> Result<ProductMedia, StoreError> {
        let media = self.media.remove(&id).ok_or(StoreError::MediaNotFound(id))?;
        if let Some(station) = self.stations.get_mut(&media.station_id) {
            station.selected_media.remove(&id);
        }
        Ok(media)
    }

    /// Rename a station's viewer-facing screen name.
    pub fn set_screen_name(
        &mut self,
        id: StationId,
        screen_name: impl Into<String>,
    ) -> Result<(), StoreError> {
        let station = self
            .stations
            .get_mut(&id)
            .ok_or(StoreError::StationNotFound(id))?;
        station.screen_name = screen_name.into();
        Ok(())
    }

    /// Delete a station together with its media; linewise groupings forget it.
    pub fn remove_station(&mut self, id: StationId) -> Result<Station, StoreError> {
        let station = self
            .stations
            .remove(&id)
            .ok_or(StoreError::StationNotFound(id))?;
        self.media.retain(|_, m| m.station_id != id);
        for linewise in self.linewises.values_mut() {
            linewise.stations.remove(&id);
        }
        Ok(station)
    }

    /// Assign a product to each station and make its active media the
    /// station's selection.
    ///
    /// For every station: the product joins the station's product set, the
    /// selected-media relation becomes exactly the station's active media of
    /// that product, and those records are flagged selected. Selected flags of
    /// other records are left untouched. All ids are checked before anything
    /// changes. Returns the number of stations updated.
    pub fn assign_product_to_stations(
        &mut self,
        product_id: ProductId,
        station_ids: &[StationId],
    ) -> Result<usize, StoreError> {
        if !self.products.contains_key(&product_id) {
            return Err(StoreError::ProductNotFound(product_id));
        }
        if let Some(missing) = station_ids
            .iter()
            .find(|id| !self.stations.contains_key(*id))
        {
            return Err(StoreError::StationNotFound(*missing));
        }

        let mut count = 0;
        for station_id in station_ids {
            let media_ids: Vec<MediaId> = self
                .media
                .values_mut()
                .filter(|m| m.product_id == product_id && m.station_id == *station_id && m.is_active)
                .map(|m| {
                    m.is_selected = true;
                    m.id
                })
                .collect();

            if let Some(station) = self.stations.get_mut(station_id) {
                station.products.insert(product_id);
                station.selected_media = media_ids.into_iter().collect();
                count += 1;
            }
        }
        Ok(count)
    }

    /// Store a linewise grouping and push its product to its stations.
    ///
    /// Returns the number of stations updated (zero when no product is set).
    pub fn save_linewise(&mut self, linewise: Linewise) -> Result<usize, StoreError> {
        self.check_linewise(&linewise)?;

        let stations: Vec<StationId> = linewise.stations.iter().copied().collect();
        let product_id = linewise.product_id;
        self.linewises.insert(linewise.id, linewise);

        match product_id {
            Some(product_id) => self.assign_product_to_stations(product_id, &stations),
            None => Ok(0),
        }
    }

    /// Every id must name an existing media record of `station_id`.
    fn check_selection(
        &self,
        station_id: StationId,
        media_ids: &[MediaId],
    ) -> Result<(), StoreError> {
        for id in media_ids {
            match self.media.get(id) {
                Some(m) if m.station_id == station_id => {}
                Some(_) => {
                    return Err(StoreError::InvalidData(format!(
                        "media {} does not belong to station {}",
                        id, station_id
                    )))
                }
                None => return Err(StoreError::MediaNotFound(*id)),
            }
        }
        Ok(())
    }

    fn check_linewise(&self, linewise: &Linewise) -> Result<(), StoreError> {
        if let Some(product_id) = linewise.product_id {
            if !self.products.contains_key(&product_id) {
                return Err(StoreError::ProductNotFound(product_id));
            }
        }
        if let Some(missing) = linewise
            .stations
            .iter()
            .find(|id| !self.stations.contains_key(*id))
        {
            return Err(StoreError::StationNotFound(*missing));
        }
        Ok(())
    }

    pub fn station_record(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn media_record(&self, id: MediaId) -> Option<&ProductMedia> {
        self.media.get(&id)
    }

    pub fn linewise(&self, id: LinewiseId) -> Option<&Linewise> {
        self.linewises.get(&id)
    }

    fn summary(station: &Station) -> StationSummary {
        StationSummary {
            id: station.id,
            name: station.name.clone(),
            screen_name: station.screen_name.clone(),
            selected_media_count: station.selected_media.len(),
        }
    }
}

impl MediaStore for MemoryStore {
    fn station(&self, id: StationId) -> Result<StationSummary, StoreError> {
        self.stations
            .get(&id)
            .map(Self::summary)
            .ok_or(StoreError::StationNotFound(id))
    }

    fn displayable_media(&self, station_id: StationId) -> Result<Vec<MediaRow>, StoreError> {
        if !self.stations.contains_key(&station_id) {
            return Err(StoreError::StationNotFound(station_id));
        }

        self.media
            .values()
            .filter(|m| m.station_id == station_id && m.is_displayable())
            .map(|m| {
                let product = self
                    .products
                    .get(&m.product_id)
                    .ok_or(StoreError::ProductNotFound(m.product_id))?;
                Ok(MediaRow {
                    id: m.id,
                    file: m.file.clone(),
                    duration: m.duration,
                    product_name: product.name.clone(),
                    product_code: product.code.clone(),
                })
            })
            .collect()
    }

    fn stations(&self) -> Result<Vec<StationSummary>, StoreError> {
        Ok(self.stations.values().map(Self::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Station 1 "Lobby" with two displayable media, plus noise on station 2.
    fn lobby_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_product(Product::new(10, "W100", "Widget")).unwrap();
        store.insert_product(Product::new(20, "G200|", "Gadget")).unwrap();
        store
            .insert_station(Station::new(1, "Lobby", "Lobby Display"))
            .unwrap();
        store
            .insert_station(Station::new(2, "Hall", "Hall Display"))
            .unwrap();
        store
            .insert_media(ProductMedia::new(1, 10, 1, "ad1.jpg", 5).selected())
            .unwrap();
        store
            .insert_media(ProductMedia::new(2, 20, 1, "ad2.mp4", 20).selected())
            .unwrap();
        store
            .insert_media(ProductMedia::new(3, 10, 2, "hall.png", 8).selected())
            .unwrap();
        store
    }

    fn ids(rows: &[MediaRow]) -> Vec<MediaId> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_displayable_media_joins_product() {
        let store = lobby_store();
        let rows = store.displayable_media(1).unwrap();

        assert_eq!(
            rows,
            vec![
                MediaRow {
                    id: 1,
                    file: "ad1.jpg".to_string(),
                    duration: 5,
                    product_name: "Widget".to_string(),
                    product_code: "W100".to_string(),
                },
                MediaRow {
                    id: 2,
                    file: "ad2.mp4".to_string(),
                    duration: 20,
                    product_name: "Gadget".to_string(),
                    product_code: "G200|".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_displayable_media_excludes_inactive() {
        let mut store = lobby_store();
        store.set_media_active(1, false).unwrap();
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![2]);
    }

    #[test]
    fn test_displayable_media_excludes_unselected() {
        let mut store = lobby_store();
        store.set_media_selected(2, false).unwrap();
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1]);
        assert_eq!(store.station(1).unwrap().selected_media_count, 1);
    }

    #[test]
    fn test_displayable_media_ordered_by_id() {
        let mut store = lobby_store();
        store
            .insert_media(ProductMedia::new(9, 20, 1, "late.gif", 3).selected())
            .unwrap();
        store
            .insert_media(ProductMedia::new(5, 10, 1, "early.png", 3).selected())
            .unwrap();
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1, 2, 5, 9]);
    }

    #[test]
    fn test_unknown_station_is_not_found() {
        let store = lobby_store();
        assert_eq!(
            store.displayable_media(99),
            Err(StoreError::StationNotFound(99))
        );
        assert_eq!(store.station(99), Err(StoreError::StationNotFound(99)));
    }

    #[test]
    fn test_station_without_selection_is_empty_not_missing() {
        let mut store = lobby_store();
        store.insert_station(Station::new(7, "Empty", "Nothing")).unwrap();
        assert_eq!(store.displayable_media(7), Ok(vec![]));
    }

    #[test]
    fn test_insert_media_checks_references_and_extension() {
        let mut store = lobby_store();
        assert_eq!(
            store.insert_media(ProductMedia::new(50, 99, 1, "x.jpg", 1)),
            Err(StoreError::ProductNotFound(99))
        );
        assert_eq!(
            store.insert_media(ProductMedia::new(50, 10, 99, "x.jpg", 1)),
            Err(StoreError::StationNotFound(99))
        );
        assert!(matches!(
            store.insert_media(ProductMedia::new(50, 10, 1, "x.exe", 1)),
            Err(StoreError::InvalidData(_))
        ));
        assert!(matches!(
            store.insert_media(ProductMedia::new(1, 10, 1, "dup.jpg", 1)),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_select_media_replaces_selection() {
        let mut store = lobby_store();
        store
            .insert_media(ProductMedia::new(4, 10, 1, "ad4.png", 7))
            .unwrap();

        store.select_media(1, &[1, 4]).unwrap();

        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1, 4]);
        assert!(!store.media_record(2).unwrap().is_selected);
        let station = store.station_record(1).unwrap();
        assert_eq!(station.selected_media.iter().copied().collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn test_select_media_rejects_foreign_media() {
        let mut store = lobby_store();
        assert!(matches!(
            store.select_media(1, &[3]),
            Err(StoreError::InvalidData(_))
        ));
        // nothing changed
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_remove_media() {
        let mut store = lobby_store();
        store.remove_media(1).unwrap();
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![2]);
        assert!(!store.station_record(1).unwrap().selected_media.contains(&1));
        assert_eq!(store.remove_media(1), Err(StoreError::MediaNotFound(1)));
    }

    #[test]
    fn test_assign_product_selects_active_media() {
        let mut store = lobby_store();
        store.insert_product(Product::new(30, "P300", "Poster")).unwrap();
        store
            .insert_media(ProductMedia::new(10, 30, 1, "poster.jpg", 4))
            .unwrap();
        store
            .insert_media(ProductMedia::new(11, 30, 1, "old.jpg", 4))
            .unwrap();
        store.set_media_active(11, false).unwrap();
        store
            .insert_media(ProductMedia::new(12, 30, 2, "hall-poster.jpg", 4))
            .unwrap();

        let count = store.assign_product_to_stations(30, &[1, 2]).unwrap();
        assert_eq!(count, 2);

        let lobby = store.station_record(1).unwrap();
        assert!(lobby.products.contains(&30));
        assert_eq!(lobby.selected_media.iter().copied().collect::<Vec<_>>(), vec![10]);
        assert!(store.media_record(10).unwrap().is_selected);
        assert!(!store.media_record(11).unwrap().is_selected);
        assert!(store.media_record(12).unwrap().is_selected);

        // Flags of previously selected records are left as they were.
        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1, 2, 10]);
    }

    #[test]
    fn test_assign_product_is_all_or_nothing() {
        let mut store = lobby_store();
        assert_eq!(
            store.assign_product_to_stations(10, &[1, 42]),
            Err(StoreError::StationNotFound(42))
        );
        assert!(store.station_record(1).unwrap().products.is_empty());
        assert_eq!(
            store.assign_product_to_stations(77, &[1]),
            Err(StoreError::ProductNotFound(77))
        );
    }

    #[test]
    fn test_save_linewise_pushes_product() {
        let mut store = lobby_store();
        store
            .insert_media(ProductMedia::new(20, 20, 2, "hall-gadget.mp4", 12))
            .unwrap();

        let linewise = Linewise {
            id: 1,
            name: "Gadget line".to_string(),
            product_id: Some(20),
            stations: [2].into_iter().collect(),
        };
        assert_eq!(store.save_linewise(linewise).unwrap(), 1);
        assert!(store.linewise(1).is_some());
        assert!(store.station_record(2).unwrap().products.contains(&20));
        assert_eq!(ids(&store.displayable_media(2).unwrap()), vec![3, 20]);

        let empty = Linewise {
            id: 2,
            name: "Unassigned".to_string(),
            product_id: None,
            stations: [1].into_iter().collect(),
        };
        assert_eq!(store.save_linewise(empty).unwrap(), 0);
    }

    #[test]
    fn test_dataset_round_trip_preserves_state() {
        let store = lobby_store();
        let rebuilt = MemoryStore::from_dataset(store.dataset()).unwrap();

        assert_eq!(rebuilt.displayable_media(1), store.displayable_media(1));
        assert_eq!(rebuilt.stations(), store.stations());
    }

    #[test]
    fn test_dataset_keeps_relation_after_product_assignment() {
        let mut store = lobby_store();
        store.assign_product_to_stations(10, &[1]).unwrap();
        assert_eq!(
            store.station_record(1).unwrap().selected_media.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
        assert!(store.media_record(2).unwrap().is_selected);

        let rebuilt = MemoryStore::from_dataset(store.dataset()).unwrap();
        assert_eq!(
            rebuilt.station_record(1).unwrap().selected_media,
            store.station_record(1).unwrap().selected_media
        );
        assert_eq!(rebuilt.station(1).unwrap().selected_media_count, 1);
        assert_eq!(rebuilt.stations(), store.stations());
    }

    #[test]
    fn test_dataset_rejects_foreign_selected_media() {
        let mut dataset = lobby_store().dataset();
        dataset.stations[0].selected_media.insert(3);
        assert!(matches!(
            MemoryStore::from_dataset(dataset),
            Err(StoreError::InvalidData(_))
        ));

        let mut dataset = lobby_store().dataset();
        dataset.stations[1].selected_media.insert(99);
        assert_eq!(
            MemoryStore::from_dataset(dataset).err(),
            Some(StoreError::MediaNotFound(99))
        );
    }

    #[test]
    fn test_insert_station_validates_selected_media() {
        let mut store = lobby_store();

        let mut station = Station::new(5, "Annex", "Annex Display");
        station.selected_media.insert(1);
        assert!(matches!(
            store.insert_station(station),
            Err(StoreError::InvalidData(_))
        ));

        let mut station = Station::new(5, "Annex", "Annex Display");
        station.selected_media.insert(42);
        assert_eq!(store.insert_station(station), Err(StoreError::MediaNotFound(42)));
        assert_eq!(store.station(5), Err(StoreError::StationNotFound(5)));
    }

    #[test]
    fn test_remove_station() {
        let mut store = lobby_store();
        store
            .save_linewise(Linewise {
                id: 1,
                name: "Widgets".to_string(),
                product_id: Some(10),
                stations: [1, 2].into_iter().collect(),
            })
            .unwrap();

        let removed = store.remove_station(1).unwrap();
        assert_eq!(removed.screen_name, "Lobby Display");
        assert_eq!(store.displayable_media(1), Err(StoreError::StationNotFound(1)));
        assert!(store.media_record(1).is_none());
        assert!(store.media_record(3).is_some());
        assert_eq!(
            store.linewise(1).unwrap().stations.iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn test_stations_listing() {
        let store = lobby_store();
        let stations = store.stations().unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].screen_name, "Lobby Display");
        assert_eq!(stations[0].selected_media_count, 2);
        assert_eq!(stations[1].selected_media_count, 1);
    }

    #[test]
    fn test_set_screen_name() {
        let mut store = lobby_store();
        store.set_screen_name(1, "Front Desk").unwrap();

        assert_eq!(store.station(1).unwrap().screen_name, "Front Desk");
        assert_eq!(
            store.set_screen_name(9, "Nowhere"),
            Err(StoreError::StationNotFound(9))
        );
    }

    #[test]
    fn test_bundled_seed_loads() {
        let dataset: Dataset = serde_json::from_str(include_str!("../../../data/seed.json")).unwrap();
        let store = MemoryStore::from_dataset(dataset).unwrap();

        assert_eq!(ids(&store.displayable_media(1).unwrap()), vec![1, 2]);
        assert!(store.displayable_media(2).unwrap().is_empty());
        assert_eq!(store.station(1).unwrap().selected_media_count, 2);
        assert_eq!(store.linewise(1).unwrap().product_id, Some(1));
    }
}
