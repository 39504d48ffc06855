//! Aircraft catalog store.
//!
//! Owns the canonical aircraft list and its sort order. The list lives under a
//! single storage key and is only ever replaced as a whole.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec;
use crate::error::Result;
use crate::model::Aircraft;
use crate::storage::KeyValueStore;
use crate::template;

/// Storage key of the persisted catalog.
pub const CATALOG_KEY: &str = "catalog:aircraft";

/// How the catalog is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// By model name, case-insensitive.
    #[default]
    ModelName,
    /// By manufacturer, then model name, both case-insensitive.
    Manufacturer,
}

impl SortOrder {
    fn compare(self, a: &Aircraft, b: &Aircraft) -> Ordering {
        let by_model = || {
            a.model_name
                .to_lowercase()
                .cmp(&b.model_name.to_lowercase())
        };
        match self {
            Self::ModelName => by_model(),
            Self::Manufacturer => a
                .manufacturer
                .to_lowercase()
                .cmp(&b.manufacturer.to_lowercase())
                .then_with(by_model),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelName => write!(f, "model_name"),
            Self::Manufacturer => write!(f, "manufacturer"),
        }
    }
}

/// The aircraft catalog.
#[derive(Debug)]
pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    aircraft: Vec<Aircraft>,
    sort_order: SortOrder,
}

impl CatalogStore {
    /// Open the catalog.
    ///
    /// Starts from the built-in template. If a persisted list exists it
    /// replaces the template entirely and is sorted by `sort_order`; otherwise
    /// the template list is persisted so later runs load it.
    ///
    /// # Errors
    ///
    /// Returns the store's read error. An unreadable record is not an error:
    /// the template is used instead.
    pub fn open(store: Arc<dyn KeyValueStore>, sort_order: SortOrder) -> Result<Self> {
        let mut catalog = Self {
            store,
            aircraft: template::default_aircraft(),
            sort_order,
        };

        if !catalog.load()? {
            info!(aircraft = catalog.aircraft.len(), "initializing catalog from template");
            if let Err(err) = catalog.save() {
                warn!(error = %err, "failed to persist initial catalog");
            }
        }
        Ok(catalog)
    }

    /// All aircraft in the current order.
    #[must_use]
    pub fn aircraft(&self) -> &[Aircraft] {
        &self.aircraft
    }

    /// Current sort order.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Reorder the list. Stable: aircraft that compare equal keep their
    /// relative order.
    pub fn sort(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.aircraft.sort_by(|a, b| order.compare(a, b));
    }

    /// Look up an aircraft by identifier.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Aircraft> {
        self.aircraft.iter().find(|a| a.id == id)
    }

    /// Find an aircraft by identifier, model name, or "manufacturer model",
    /// case-insensitive.
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&Aircraft> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self.get(id);
        }
        let lowered = query.to_lowercase();
        self.aircraft.iter().find(|a| {
            a.model_name.to_lowercase() == lowered || a.display_name().to_lowercase() == lowered
        })
    }

    /// Aircraft whose model name or manufacturer contains `query`,
    /// case-insensitive. An empty query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Aircraft> {
        let query = query.trim().to_lowercase();
        self.aircraft
            .iter()
            .filter(|a| {
                a.model_name.to_lowercase().contains(&query)
                    || a.manufacturer.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Distinct manufacturers, sorted.
    #[must_use]
    pub fn manufacturers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aircraft.iter().map(|a| a.manufacturer.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Aircraft built by `manufacturer` (exact match), in catalog order.
    #[must_use]
    pub fn by_manufacturer(&self, manufacturer: &str) -> Vec<&Aircraft> {
        self.aircraft
            .iter()
            .filter(|a| a.manufacturer == manufacturer)
            .collect()
    }

    /// Replace the whole list with the built-in template and persist it.
    ///
    /// # Errors
    ///
    /// Returns the write error if the new list could not be saved; the
    /// in-memory list is replaced regardless.
    pub fn reset_to_template(&mut self) -> Result<()> {
        self.aircraft = template::default_aircraft();
        self.sort(self.sort_order);
        info!(aircraft = self.aircraft.len(), "catalog reset to template");
        self.save()
    }

    /// Persist the current list.
    ///
    /// # Errors
    ///
    /// Returns an encode or write error.
    pub fn save(&self) -> Result<()> {
        let bytes = codec::encode(CATALOG_KEY, &self.aircraft)?;
        self.store.put(CATALOG_KEY, &bytes)?;
        debug!(aircraft = self.aircraft.len(), "catalog saved");
        Ok(())
    }

    /// Replace the in-memory list with the persisted one, sorted by the
    /// current order. Returns `false` if there is no readable record.
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub fn load(&mut self) -> Result<bool> {
        let Some(bytes) = self.store.get(CATALOG_KEY)? else {
            return Ok(false);
        };
        match codec::decode::<Vec<Aircraft>>(CATALOG_KEY, &bytes) {
            Ok(aircraft) => {
                self.aircraft = aircraft;
                self.sort(self.sort_order);
                debug!(aircraft = self.aircraft.len(), "catalog loaded");
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "stored catalog unreadable, keeping current list");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::SqliteStore;

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open_in_memory().unwrap())
    }

    fn models(catalog: &CatalogStore) -> Vec<&str> {
        catalog
            .aircraft()
            .iter()
            .map(|a| a.model_name.as_str())
            .collect()
    }

    #[test]
    fn test_first_open_uses_template_order_and_persists() {
        let store = store();
        let catalog = CatalogStore::open(store.clone(), SortOrder::ModelName).unwrap();

        assert_eq!(catalog.aircraft(), template::default_aircraft().as_slice());
        assert!(store.get(CATALOG_KEY).unwrap().is_some());
    }

    #[test]
    fn test_reopen_loads_persisted_list_sorted() {
        let store = store();
        let custom = vec![
            Aircraft::new("zephyr", "Acme", "z"),
            Aircraft::new("Alpha", "Acme", "a"),
        ];
        store
            .put(CATALOG_KEY, &codec::encode(CATALOG_KEY, &custom).unwrap())
            .unwrap();

        let catalog = CatalogStore::open(store, SortOrder::ModelName).unwrap();
        assert_eq!(models(&catalog), ["Alpha", "zephyr"]);
    }

    #[test]
    fn test_corrupt_catalog_falls_back_to_template() {
        let store = store();
        store.put(CATALOG_KEY, b"nope").unwrap();

        let catalog = CatalogStore::open(store.clone(), SortOrder::ModelName).unwrap();
        assert_eq!(catalog.aircraft().len(), 25);

        // The template replaced the unreadable record.
        let bytes = store.get(CATALOG_KEY).unwrap().unwrap();
        assert!(codec::decode::<Vec<Aircraft>>(CATALOG_KEY, &bytes).is_ok());
    }

    #[test]
    fn test_sort_by_model_name_is_case_insensitive() {
        let mut catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        catalog.aircraft = vec![
            Aircraft::new("b", "X", ""),
            Aircraft::new("A", "X", ""),
            Aircraft::new("C", "X", ""),
        ];
        catalog.sort(SortOrder::ModelName);
        assert_eq!(models(&catalog), ["A", "b", "C"]);
    }

    #[test]
    fn test_sort_by_manufacturer_then_model() {
        let mut catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        catalog.aircraft = vec![
            Aircraft::new("SR22", "cirrus", ""),
            Aircraft::new("182", "Cessna", ""),
            Aircraft::new("172", "cessna", ""),
            Aircraft::new("SR20", "Cirrus", ""),
        ];
        catalog.sort(SortOrder::Manufacturer);
        assert_eq!(models(&catalog), ["172", "182", "SR20", "SR22"]);
        assert_eq!(catalog.sort_order(), SortOrder::Manufacturer);
    }

    #[test]
    fn test_sort_full_template_by_manufacturer() {
        let mut catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        catalog.sort(SortOrder::Manufacturer);

        let first = &catalog.aircraft()[0];
        assert_eq!(first.manufacturer, "Beechcraft");
        assert_eq!(first.model_name, "Baron G58");
        let last = catalog.aircraft().last().unwrap();
        assert_eq!(last.manufacturer, "Vans");
    }

    #[test]
    fn test_search() {
        let catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();

        let cessnas = catalog.search("  CESSNA ");
        assert_eq!(cessnas.len(), 5);

        let tbm = catalog.search("tbm");
        assert_eq!(tbm.len(), 2);
        assert!(tbm.iter().all(|a| a.manufacturer == "Daher"));

        assert_eq!(catalog.search("").len(), 25);
        assert!(catalog.search("concorde").is_empty());
    }

    #[test]
    fn test_find() {
        let catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        let skyhawk = catalog.find("172 skyhawk").unwrap();
        assert_eq!(skyhawk.manufacturer, "Cessna");

        assert_eq!(catalog.find("Cessna 172 Skyhawk"), Some(skyhawk));
        assert_eq!(catalog.find(&skyhawk.id.to_string()), Some(skyhawk));
        assert!(catalog.find("Concorde").is_none());
    }

    #[test]
    fn test_manufacturers_unique_sorted() {
        let catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        let names = catalog.manufacturers();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "Beechcraft");
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_by_manufacturer() {
        let catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        assert_eq!(catalog.by_manufacturer("Piper").len(), 4);
        assert!(catalog.by_manufacturer("piper").is_empty());
    }

    #[test]
    fn test_reset_to_template_overwrites_list() {
        let store = store();
        let mut catalog = CatalogStore::open(store.clone(), SortOrder::ModelName).unwrap();
        catalog.aircraft.truncate(3);
        catalog.save().unwrap();

        catalog.reset_to_template().unwrap();
        assert_eq!(catalog.aircraft().len(), 25);

        let reopened = CatalogStore::open(store, SortOrder::ModelName).unwrap();
        assert_eq!(reopened.aircraft(), catalog.aircraft());
    }

    #[test]
    fn test_template_ids_stable_across_reset() {
        let mut catalog = CatalogStore::open(store(), SortOrder::ModelName).unwrap();
        let before: HashSet<_> = catalog.aircraft().iter().map(|a| a.id).collect();
        catalog.reset_to_template().unwrap();
        let after: HashSet<_> = catalog.aircraft().iter().map(|a| a.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sort_order_display() {
        assert_eq!(SortOrder::ModelName.to_string(), "model_name");
        assert_eq!(SortOrder::Manufacturer.to_string(), "manufacturer");
        assert_eq!(SortOrder::default(), SortOrder::ModelName);
    }
}
