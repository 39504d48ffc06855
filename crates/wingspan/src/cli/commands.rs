//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::SortOrder;
use crate::model::ItemStatus;

/// Aircraft catalog commands.
#[derive(Debug, Subcommand)]
pub enum AircraftCommand {
    /// List aircraft in the catalog
    List {
        /// Sort order (defaults to the configured order)
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,

        /// Only show aircraft whose model or manufacturer contains this text
        #[arg(short = 'S', long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List manufacturers in the catalog
    Manufacturers,
}

/// Checklist commands. `AIRCRAFT` is an id, a model name, or
/// "manufacturer model".
#[derive(Debug, Subcommand)]
pub enum ChecklistCommand {
    /// Print an aircraft's checklist
    Show {
        /// Aircraft to show
        aircraft: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print an aircraft's checklist and remember it for `resume`
    Open {
        /// Aircraft to open
        aircraft: String,
    },

    /// Set the status of one checklist item
    Set {
        /// Aircraft whose checklist to change
        aircraft: String,

        /// Item id or title
        item: String,

        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Reset an aircraft's checklist to the default
    Reset {
        /// Aircraft whose checklist to reset
        aircraft: String,

        /// Keep the identifier of this section (id or title); repeatable
        #[arg(short, long, value_name = "SECTION")]
        preserve: Vec<String>,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Reset-all command arguments.
#[derive(Debug, Args)]
pub struct ResetAllCommand {
    /// Only reset aircraft from this manufacturer
    #[arg(short, long)]
    pub manufacturer: Option<String>,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Catalog sort order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// By model name
    Model,
    /// By manufacturer, then model name
    Manufacturer,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Model => Self::ModelName,
            SortArg::Manufacturer => Self::Manufacturer,
        }
    }
}

/// Item status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Not yet checked
    Pending,
    /// Checked and fine
    Done,
    /// Checked and found a problem
    Failed,
}

impl From<StatusArg> for ItemStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::NotCompleted,
            StatusArg::Done => Self::Completed,
            StatusArg::Failed => Self::Failed,
        }
    }
}
