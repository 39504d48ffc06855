//! `wingspan` - Persistent pre-flight checklists per aircraft
//!
//! This library holds the aircraft catalog, one checklist per aircraft with
//! derived completion aggregates, and the durable key-value store behind them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod checklist;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod last_viewed;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod storage;
pub mod template;

pub use catalog::{CatalogStore, SortOrder};
pub use checklist::{ChecklistHandle, ChecklistRegistry, ChecklistSummary, SectionSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use last_viewed::LastViewed;
pub use logging::init_logging;
pub use model::{AggregateStatus, Aircraft, ChecklistItem, ChecklistSection, ItemStatus};
pub use storage::{KeyValueStore, SqliteStore, StorageStats};
pub use template::{ChecklistTemplate, PreflightTemplate};
