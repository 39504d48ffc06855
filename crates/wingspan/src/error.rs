//! Error types for wingspan.
//!
//! This module defines all error types used throughout the wingspan crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// The main error type for wingspan operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A value could not be written under its key.
    #[error("failed to write record '{key}': {source}")]
    Write {
        /// Storage key of the record.
        key: String,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    // === Codec Errors ===
    /// A value could not be encoded for storage.
    #[error("failed to encode record '{key}': {source}")]
    Encode {
        /// Storage key of the record.
        key: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes did not match the expected structure.
    #[error("failed to decode record '{key}': {source}")]
    Decode {
        /// Storage key of the record.
        key: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Lookup Errors ===
    /// No aircraft in the catalog matches the query.
    #[error("unknown aircraft: {query}")]
    UnknownAircraft {
        /// What the caller asked for.
        query: String,
    },

    /// No checklist item matches the query.
    #[error("no checklist item matching '{query}' for aircraft {aircraft_id}")]
    UnknownItem {
        /// Aircraft whose checklist was searched.
        aircraft_id: Uuid,
        /// What the caller asked for.
        query: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for wingspan operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown aircraft error.
    #[must_use]
    pub fn unknown_aircraft(query: impl Into<String>) -> Self {
        Self::UnknownAircraft {
            query: query.into(),
        }
    }

    /// Check if this error means stored bytes could not be decoded.
    #[must_use]
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Check if this error means a durable write did not complete.
    #[must_use]
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::Encode { .. } | Self::DatabaseQuery(_) | Self::Io(_)
        )
    }
}
