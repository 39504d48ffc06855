//! Per-aircraft checklist state.
//!
//! A [`ChecklistHandle`] owns one aircraft's section sequence and mediates
//! every read and mutation of it. Handles are obtained from a
//! [`ChecklistRegistry`], which guarantees one live handle per aircraft so
//! that every view of the same checklist sees the same state.
//!
//! Mutations follow mutate-then-persist: the change is applied in memory,
//! aggregates are recomputed, and the whole sequence is written through
//! before the call returns. Writes for one aircraft are serialized by the
//! handle's lock, so the last submitted write is the one left on disk.
//!
//! A failed write never rolls back the in-memory change. The handle is marked
//! dirty and the next mutation or [`ChecklistHandle::save`] retries.

pub mod registry;
pub mod summary;

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{AggregateStatus, ChecklistSection, ItemStatus};
use crate::persistence::ChecklistPersistence;
use crate::template::ChecklistTemplate;

pub use registry::ChecklistRegistry;
pub use summary::{ChecklistSummary, SectionSummary};

#[derive(Debug)]
struct ChecklistState {
    sections: Vec<ChecklistSection>,
    summary: ChecklistSummary,
    /// In-memory state has not been committed to storage.
    dirty: bool,
    /// The stored record could not be read on open, so the in-memory default
    /// may be hiding a good record. Cleared by a re-read or a mutation.
    unverified: bool,
}

impl ChecklistState {
    fn new(sections: Vec<ChecklistSection>) -> Self {
        let summary = ChecklistSummary::of_sections(&sections);
        Self {
            sections,
            summary,
            dirty: false,
            unverified: false,
        }
    }

    fn replace(&mut self, sections: Vec<ChecklistSection>) {
        self.sections = sections;
        self.summary = ChecklistSummary::of_sections(&self.sections);
    }
}

/// The long-lived store handle for one aircraft's checklist.
#[derive(Debug)]
pub struct ChecklistHandle {
    aircraft_id: Uuid,
    persistence: ChecklistPersistence,
    template: Arc<dyn ChecklistTemplate>,
    state: RwLock<ChecklistState>,
    summary_tx: watch::Sender<ChecklistSummary>,
}

impl ChecklistHandle {
    /// Load the aircraft's checklist, or synthesize and persist the default.
    ///
    /// Unreadable records are treated as absent. If the store itself cannot
    /// be read, the default is used in memory but not written, and the handle
    /// is marked unverified: [`save`](Self::save) re-reads before writing, so
    /// a transient read error never overwrites a good record unless the user
    /// changes the checklist first.
    pub(crate) fn open(
        aircraft_id: Uuid,
        persistence: ChecklistPersistence,
        template: Arc<dyn ChecklistTemplate>,
    ) -> Self {
        let (state, write_default) = match persistence.load(aircraft_id) {
            Ok(Some(sections)) => {
                debug!(%aircraft_id, sections = sections.len(), "loaded stored checklist");
                (ChecklistState::new(sections), false)
            }
            Ok(None) => {
                info!(%aircraft_id, "no stored checklist, creating default");
                (ChecklistState::new(template.sections()), true)
            }
            Err(err) if err.is_decode_failure() => {
                warn!(%aircraft_id, error = %err, "stored checklist unreadable, creating default");
                (ChecklistState::new(template.sections()), true)
            }
            Err(err) => {
                error!(
                    %aircraft_id,
                    error = %err,
                    "failed to read checklist, using default in memory",
                );
                let mut state = ChecklistState::new(template.sections());
                state.unverified = true;
                (state, false)
            }
        };

        let (summary_tx, _) = watch::channel(state.summary);
        let handle = Self {
            aircraft_id,
            persistence,
            template,
            state: RwLock::new(state),
            summary_tx,
        };

        if write_default {
            let mut state = handle.write();
            // Logged by persist; the handle stays dirty and retries later.
            let _ = handle.persist(&mut state);
        }
        handle
    }

    fn read(&self) -> RwLockReadGuard<'_, ChecklistState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChecklistState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &mut ChecklistState) -> Result<()> {
        match self.persistence.save(self.aircraft_id, &state.sections) {
            Ok(()) => {
                state.dirty = false;
                debug!(aircraft_id = %self.aircraft_id, "checklist saved");
                Ok(())
            }
            Err(err) => {
                state.dirty = true;
                error!(
                    aircraft_id = %self.aircraft_id,
                    error = %err,
                    "failed to save checklist, keeping in-memory state"
                );
                Err(err)
            }
        }
    }

    fn publish(&self, summary: ChecklistSummary) {
        self.summary_tx.send_replace(summary);
    }

    /// The aircraft this checklist belongs to.
    #[must_use]
    pub fn aircraft_id(&self) -> Uuid {
        self.aircraft_id
    }

    /// Snapshot of all sections in display order.
    #[must_use]
    pub fn sections(&self) -> Vec<ChecklistSection> {
        self.read().sections.clone()
    }

    /// Snapshot of one section.
    #[must_use]
    pub fn section(&self, section_id: Uuid) -> Option<ChecklistSection> {
        self.read()
            .sections
            .iter()
            .find(|s| s.id == section_id)
            .cloned()
    }

    /// Set one item's status and write the checklist through.
    ///
    /// Unknown section or item identifiers are ignored: they come from views
    /// holding references invalidated by a reset. Setting the status an item
    /// already has does not write, unless an earlier write is still pending.
    ///
    /// # Errors
    ///
    /// Returns the persistence error if the write fails. The new status is
    /// kept in memory either way.
    pub fn set_status(&self, section_id: Uuid, item_id: Uuid, status: ItemStatus) -> Result<()> {
        let mut state = self.write();

        let Some(item) = state
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .and_then(|s| s.items.iter_mut().find(|i| i.id == item_id))
        else {
            debug!(
                aircraft_id = %self.aircraft_id,
                %section_id,
                %item_id,
                "ignoring status change for unknown item"
            );
            return Ok(());
        };

        if item.status == status {
            if !state.dirty {
                return Ok(());
            }
        } else {
            debug!(
                aircraft_id = %self.aircraft_id,
                %item_id,
                from = %item.status,
                to = %status,
                "status change",
            );
            item.status = status;
            state.unverified = false;
            state.summary = ChecklistSummary::of_sections(&state.sections);
            self.publish(state.summary);
        }

        self.persist(&mut state)
    }

    /// Replace the checklist with a fresh copy of the template.
    ///
    /// Every item goes back to not completed. Positionally, for each of the
    /// first `min(old, new)` sections whose old identifier is in
    /// `preserving`, the new section takes over that identifier, so UI state
    /// keyed by section id (such as which sections are expanded) survives.
    ///
    /// Matching is by position, not title: if the template's section order
    /// changes between versions a preserved id can land on a different
    /// section.
    ///
    /// # Errors
    ///
    /// Returns the persistence error if the write fails. The reset is kept in
    /// memory either way.
    pub fn reset(&self, preserving: &HashSet<Uuid>) -> Result<()> {
        let mut fresh = self.template.sections();
        let mut state = self.write();

        for (new, old) in fresh.iter_mut().zip(&state.sections) {
            if preserving.contains(&old.id) {
                new.id = old.id;
            }
        }

        state.replace(fresh);
        state.unverified = false;
        info!(
            aircraft_id = %self.aircraft_id,
            preserved = preserving.len(),
            "checklist reset"
        );
        self.publish(state.summary);
        self.persist(&mut state)
    }

    /// Force the current state to storage.
    ///
    /// For lifecycle boundaries such as entering the background or shutting
    /// down. If the handle is unverified the stored record is read first; a
    /// record found there is adopted instead of being overwritten.
    ///
    /// # Errors
    ///
    /// Returns the persistence error if the write fails, or the read error if
    /// an unverified handle still cannot read the store (nothing is written
    /// then).
    pub fn save(&self) -> Result<()> {
        let mut state = self.write();
        if state.unverified && self.adopt_stored(&mut state)? {
            return Ok(());
        }
        self.persist(&mut state)
    }

    /// Re-read an unverified handle's record. Returns `true` if a stored
    /// checklist replaced the in-memory default.
    fn adopt_stored(&self, state: &mut ChecklistState) -> Result<bool> {
        let adopted = match self.persistence.load(self.aircraft_id) {
            Ok(Some(sections)) => {
                info!(
                    aircraft_id = %self.aircraft_id,
                    "store readable again, adopting stored checklist",
                );
                state.replace(sections);
                state.dirty = false;
                self.publish(state.summary);
                true
            }
            Ok(None) => false,
            Err(err) if err.is_decode_failure() => {
                warn!(
                    aircraft_id = %self.aircraft_id,
                    error = %err,
                    "stored checklist unreadable, replacing with default",
                );
                false
            }
            Err(err) => {
                warn!(
                    aircraft_id = %self.aircraft_id,
                    error = %err,
                    "store still unreadable, not saving",
                );
                return Err(err);
            }
        };
        state.unverified = false;
        Ok(adopted)
    }

    /// Reload the checklist from storage.
    ///
    /// Returns `true` if the in-memory state was replaced. Nothing is
    /// replaced when no record exists, when the record is unreadable, or when
    /// the handle holds changes that have not been written yet (in-memory
    /// state wins until it is saved).
    ///
    /// # Errors
    ///
    /// Returns the store's read error.
    pub fn load(&self) -> Result<bool> {
        let mut state = self.write();
        if state.dirty {
            warn!(aircraft_id = %self.aircraft_id, "unsaved changes pending, not reloading");
            return Ok(false);
        }

        let sections = match self.persistence.load(self.aircraft_id) {
            Ok(Some(sections)) => sections,
            Ok(None) => return Ok(false),
            Err(err) if err.is_decode_failure() => {
                warn!(
                    aircraft_id = %self.aircraft_id,
                    error = %err,
                    "stored checklist unreadable, keeping in-memory state",
                );
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        state.replace(sections);
        state.unverified = false;
        self.publish(state.summary);
        Ok(true)
    }

    /// Current aggregates.
    #[must_use]
    pub fn summary(&self) -> ChecklistSummary {
        self.read().summary
    }

    /// Number of completed items across all sections.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.summary().completed
    }

    /// Number of items across all sections.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.summary().total
    }

    /// `completed_count / total_count`, 0 when there are no items.
    #[must_use]
    pub fn completion_fraction(&self) -> f64 {
        self.summary().fraction()
    }

    /// Failed, complete, partial or untouched, in that precedence.
    #[must_use]
    pub fn aggregate_status(&self) -> AggregateStatus {
        self.summary().status
    }

    /// Aggregates per section, in display order.
    #[must_use]
    pub fn section_summaries(&self) -> Vec<SectionSummary> {
        self.read().sections.iter().map(SectionSummary::of).collect()
    }

    /// Whether the in-memory state has yet to be committed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    /// Watch the aggregates. The receiver sees a new value after every
    /// applied status change, reset and reload.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChecklistSummary> {
        self.summary_tx.subscribe()
    }

    /// Find an item by identifier or case-insensitive title.
    ///
    /// Returns `(section_id, item_id)` of the first match in display order.
    #[must_use]
    pub fn find_item(&self, query: &str) -> Option<(Uuid, Uuid)> {
        let query = query.trim();
        let by_id = Uuid::parse_str(query).ok();
        let lowered = query.to_lowercase();

        self.read().sections.iter().find_map(|section| {
            section
                .items
                .iter()
                .find(|item| Some(item.id) == by_id || item.title.to_lowercase() == lowered)
                .map(|item| (section.id, item.id))
        })
    }
}
