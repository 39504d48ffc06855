//! Last-viewed aircraft pointer.
//!
//! A single file holding a snapshot of the aircraft whose checklist was most
//! recently opened. Written on navigation, read once at launch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::model::Aircraft;

const RECORD_KEY: &str = "last_viewed";

/// File-backed pointer to the most recently viewed aircraft.
#[derive(Debug, Clone)]
pub struct LastViewed {
    path: PathBuf,
}

impl LastViewed {
    /// Pointer stored at `path`. Nothing is read or created until used.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored record with `aircraft`.
    ///
    /// The record is written to a sibling temp file and renamed into place,
    /// so a reader sees either the old record or the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// cannot be written.
    pub fn record_viewed(&self, aircraft: &Aircraft) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let bytes = codec::encode(RECORD_KEY, aircraft)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            aircraft = %aircraft.display_name(),
            path = %self.path.display(),
            "recorded last viewed",
        );
        Ok(())
    }

    /// The last recorded aircraft, if any.
    ///
    /// A missing or unreadable file yields `None`.
    #[must_use]
    pub fn last_viewed(&self) -> Option<Aircraft> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read last viewed record");
                return None;
            }
        };

        match codec::decode(RECORD_KEY, &bytes) {
            Ok(aircraft) => Some(aircraft),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable last viewed record",
                );
                None
            }
        }
    }
}
