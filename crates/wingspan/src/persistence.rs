//! Checklist persistence adapter.
//!
//! Maps an aircraft identifier to its storage key and moves whole section
//! sequences in and out of a [`KeyValueStore`].

use std::sync::Arc;

use uuid::Uuid;

use crate::codec;
use crate::error::Result;
use crate::model::ChecklistSection;
use crate::storage::KeyValueStore;

/// Prefix shared by every per-aircraft checklist key.
pub const CHECKLIST_KEY_PREFIX: &str = "checklist:";

/// Storage key for one aircraft's checklist.
#[must_use]
pub fn checklist_key(aircraft_id: Uuid) -> String {
    format!("{CHECKLIST_KEY_PREFIX}{aircraft_id}")
}

/// Saves and loads checklists keyed by aircraft identifier.
#[derive(Debug, Clone)]
pub struct ChecklistPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl ChecklistPersistence {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Encode and commit `sections` under the aircraft's key.
    ///
    /// Returns only after the store has committed the bytes.
    ///
    /// # Errors
    ///
    /// Returns an encode or write error; the previously stored value is left
    /// in place.
    pub fn save(&self, aircraft_id: Uuid, sections: &[ChecklistSection]) -> Result<()> {
        let key = checklist_key(aircraft_id);
        let bytes = codec::encode(&key, &sections)?;
        self.store.put(&key, &bytes)
    }

    /// Load the stored sections, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the stored bytes are unreadable, or
    /// the store's read error.
    pub fn load(&self, aircraft_id: Uuid) -> Result<Option<Vec<ChecklistSection>>> {
        let key = checklist_key(aircraft_id);
        match self.store.get(&key)? {
            Some(bytes) => codec::decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }
}
