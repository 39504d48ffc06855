//! Registry of live checklist handles.
//!
//! The registry is an ordinary value, created at startup and passed to
//! whatever needs checklists. It holds at most one [`ChecklistHandle`] per
//! aircraft: lookup and construction for a key happen under one lock, so two
//! near-simultaneous requests for the same aircraft get the same handle.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ChecklistHandle;
use crate::error::Result;
use crate::persistence::{checklist_key, ChecklistPersistence};
use crate::storage::KeyValueStore;
use crate::template::{ChecklistTemplate, PreflightTemplate};

/// Owns one [`ChecklistHandle`] per aircraft for the life of the registry.
#[derive(Debug)]
pub struct ChecklistRegistry {
    persistence: ChecklistPersistence,
    template: Arc<dyn ChecklistTemplate>,
    handles: Mutex<HashMap<String, Arc<ChecklistHandle>>>,
}

impl ChecklistRegistry {
    /// Create an empty registry over `store`, defaulting new checklists from
    /// `template`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, template: Arc<dyn ChecklistTemplate>) -> Self {
        Self {
            persistence: ChecklistPersistence::new(store),
            template,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Create an empty registry using the standard pre-flight template.
    #[must_use]
    pub fn with_preflight_template(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(PreflightTemplate))
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<String, Arc<ChecklistHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The handle for `aircraft_id`, created on first access.
    ///
    /// First access loads the stored checklist, or synthesizes and persists
    /// the default. Every later call returns the same handle.
    pub fn for_aircraft(&self, aircraft_id: Uuid) -> Arc<ChecklistHandle> {
        let key = checklist_key(aircraft_id);
        let mut handles = self.handles();

        if let Some(existing) = handles.get(&key) {
            debug!(%aircraft_id, "reusing checklist handle");
            return Arc::clone(existing);
        }

        let handle = Arc::new(ChecklistHandle::open(
            aircraft_id,
            self.persistence.clone(),
            Arc::clone(&self.template),
        ));
        handles.insert(key, Arc::clone(&handle));
        debug!(%aircraft_id, live = handles.len(), "created checklist handle");
        handle
    }

    /// The handle for `aircraft_id` if one is already live.
    #[must_use]
    pub fn get(&self, aircraft_id: Uuid) -> Option<Arc<ChecklistHandle>> {
        self.handles().get(&checklist_key(aircraft_id)).cloned()
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles().len()
    }

    /// Whether no handle has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }

    /// Save every live handle.
    ///
    /// Every handle is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered.
    pub fn save_all(&self) -> Result<()> {
        let handles: Vec<_> = self.handles().values().cloned().collect();
        let mut first_error = None;
        for handle in &handles {
            if let Err(err) = handle.save() {
                first_error.get_or_insert(err);
            }
        }
        info!(handles = handles.len(), ok = first_error.is_none(), "saved all checklists");
        first_error.map_or(Ok(()), Err)
    }

    /// Reset the checklists of every aircraft in `aircraft_ids`.
    ///
    /// No section identities are preserved. Every aircraft is attempted even
    /// if an earlier write fails.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered.
    pub fn reset_all(&self, aircraft_ids: impl IntoIterator<Item = Uuid>) -> Result<()> {
        let none = HashSet::new();
        let mut first_error = None;
        let mut count = 0_usize;
        for aircraft_id in aircraft_ids {
            count += 1;
            if let Err(err) = self.for_aircraft(aircraft_id).reset(&none) {
                first_error.get_or_insert(err);
            }
        }
        info!(aircraft = count, "reset checklists");
        first_error.map_or(Ok(()), Err)
    }

    /// Flush and drop the handle for `aircraft_id`.
    ///
    /// The next [`for_aircraft`](Self::for_aircraft) reloads it from storage.
    /// Returns `false` without doing anything if the handle is not live or is
    /// still referenced elsewhere, since dropping it then would let a second
    /// handle for the same aircraft come into existence.
    ///
    /// # Errors
    ///
    /// Returns the write error if the final save fails; the handle stays
    /// registered in that case.
    pub fn evict(&self, aircraft_id: Uuid) -> Result<bool> {
        let key = checklist_key(aircraft_id);
        let mut handles = self.handles();

        let Some(handle) = handles.get(&key) else {
            return Ok(false);
        };
        if Arc::strong_count(handle) > 1 {
            warn!(%aircraft_id, "checklist handle still in use, not evicting");
            return Ok(false);
        }

        handle.save()?;
        handles.remove(&key);
        debug!(%aircraft_id, "evicted checklist handle");
        Ok(true)
    }
}
