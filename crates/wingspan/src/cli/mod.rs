//! Command-line interface for wingspan.
//!
//! This module provides the CLI structure for the `wingspan` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    AircraftCommand, ChecklistCommand, ConfigCommand, ResetAllCommand, SortArg, StatusArg,
    StatusCommand,
};

/// wingspan - Pre-flight checklists for your aircraft
///
/// Keeps a persistent pre-flight checklist per aircraft and tracks which
/// items have been completed or failed.
#[derive(Debug, Parser)]
#[command(name = "wingspan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the aircraft catalog
    #[command(subcommand)]
    Aircraft(AircraftCommand),

    /// View and update checklists
    #[command(subcommand)]
    Checklist(ChecklistCommand),

    /// Reset every checklist, or every checklist for one manufacturer
    ResetAll(ResetAllCommand),

    /// Show checklist progress for every aircraft
    Status(StatusCommand),

    /// Reopen the most recently opened checklist
    Resume,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
