//! Derived checklist aggregates.

use serde::Serialize;
use uuid::Uuid;

use crate::model::{AggregateStatus, ChecklistItem, ChecklistSection, ItemStatus};

/// Completion counts and aggregate status over a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistSummary {
    /// Items with status completed.
    pub completed: usize,
    /// All items.
    pub total: usize,
    /// Aggregate classification.
    pub status: AggregateStatus,
}

impl ChecklistSummary {
    /// Summarize a set of items.
    ///
    /// Precedence is failed, then complete (non-empty and all completed),
    /// then partial (at least one completed), then untouched.
    pub fn of<'a>(items: impl IntoIterator<Item = &'a ChecklistItem>) -> Self {
        let mut completed = 0;
        let mut total = 0;
        let mut failed = false;
        for item in items {
            total += 1;
            match item.status {
                ItemStatus::Completed => completed += 1,
                ItemStatus::Failed => failed = true,
                ItemStatus::NotCompleted => {}
            }
        }

        let status = if failed {
            AggregateStatus::Failed
        } else if total > 0 && completed == total {
            AggregateStatus::Complete
        } else if completed > 0 {
            AggregateStatus::Partial
        } else {
            AggregateStatus::Untouched
        };

        Self {
            completed,
            total,
            status,
        }
    }

    /// Summarize every item across all sections.
    #[must_use]
    pub fn of_sections(sections: &[ChecklistSection]) -> Self {
        Self::of(sections.iter().flat_map(|s| &s.items))
    }

    /// `completed / total`, or 0 for an empty checklist.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Completion as a whole percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// Summary of a single section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    /// Section identifier.
    pub section_id: Uuid,
    /// Section title.
    pub title: String,
    /// Aggregates over the section's items.
    #[serde(flatten)]
    pub summary: ChecklistSummary,
}

impl SectionSummary {
    /// Summarize one section.
    #[must_use]
    pub fn of(section: &ChecklistSection) -> Self {
        Self {
            section_id: section.id,
            title: section.title.clone(),
            summary: ChecklistSummary::of(&section.items),
        }
    }
}
