//! Core entity types for wingspan.
//!
//! Plain values: aircraft, checklist items and sections, and the status
//! enumerations. All behavior lives in the stores.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic aircraft identifiers.
const AIRCRAFT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3b0e_9a54_4d7e_8f2a_1b5c_77e0_d3a9);

/// A catalog entry identifying one aircraft model/manufacturer pairing.
///
/// `PartialEq` is structural. Use [`Aircraft::is_same_aircraft`] when only
/// identity matters, e.g. for selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aircraft {
    /// Stable unique identifier.
    pub id: Uuid,
    /// Model name, e.g. "172 Skyhawk".
    pub model_name: String,
    /// Manufacturer, e.g. "Cessna".
    pub manufacturer: String,
    /// Image asset reference.
    pub image_name: String,
}

impl Aircraft {
    /// Create an aircraft whose identifier is derived from its manufacturer
    /// and model name, so the same template entry always gets the same id.
    #[must_use]
    pub fn new(
        model_name: impl Into<String>,
        manufacturer: impl Into<String>,
        image_name: impl Into<String>,
    ) -> Self {
        let model_name = model_name.into();
        let manufacturer = manufacturer.into();
        let id = Uuid::new_v5(
            &AIRCRAFT_NAMESPACE,
            format!("{manufacturer}/{model_name}").as_bytes(),
        );
        Self {
            id,
            model_name,
            manufacturer,
            image_name: image_name.into(),
        }
    }

    /// Identity comparison.
    #[must_use]
    pub fn is_same_aircraft(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// "Manufacturer Model", as shown in headings.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.manufacturer, self.model_name)
    }
}

/// Status of a single checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not yet checked.
    #[default]
    NotCompleted,
    /// Checked and fine.
    Completed,
    /// Checked and found a problem.
    Failed,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCompleted => write!(f, "not_completed"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single line of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique identifier.
    pub id: Uuid,
    /// Short title.
    pub title: String,
    /// Longer explanation; may be empty.
    #[serde(default)]
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: ItemStatus,
}

impl ChecklistItem {
    /// Create a not-completed item with a fresh identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            status: ItemStatus::NotCompleted,
        }
    }
}

/// An ordered group of checklist items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    /// Unique identifier.
    pub id: Uuid,
    /// Section title.
    pub title: String,
    /// Items in display order.
    pub items: Vec<ChecklistItem>,
}

impl ChecklistSection {
    /// Create a section with a fresh identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            items,
        }
    }
}

/// Single-value summary of a set of item statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// Nothing completed and nothing failed.
    Untouched,
    /// Some, but not all, items completed.
    Partial,
    /// Every item completed.
    Complete,
    /// At least one item failed.
    Failed,
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untouched => write!(f, "untouched"),
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
