//! Durable key-value storage for wingspan.
//!
//! The stores above this layer only ever exchange whole encoded records with
//! it: one key per aircraft checklist, one key for the catalog. The
//! [`KeyValueStore`] trait is the seam; [`SqliteStore`] is the backing used by
//! the application.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};

/// A durable byte store addressed by string keys.
///
/// `put` must be atomic per key: after it returns `Ok`, the new value is
/// committed; if it fails, the previous value is still readable.
pub trait KeyValueStore: std::fmt::Debug + Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the value could not be committed.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// `SQLite`-backed [`KeyValueStore`].
///
/// The connection sits behind a mutex so a single store can be shared by
/// every checklist handle in the process.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // FULL sync: a returned put must survive power loss.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-applied in SQLite.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count records whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_with_prefix(&self, prefix: &str) -> Result<i64> {
        let pattern = format!("{}%", escape_like(prefix));
        let count: i64 = self.conn().query_row(
            r"SELECT COUNT(*) FROM records WHERE key LIKE ?1 ESCAPE '\'",
            [pattern],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_records, last_write) = {
            let conn = self.conn();
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            let newest: Option<String> =
                conn.query_row("SELECT MAX(updated_at) FROM records", [], |row| row.get(0))?;
            (total, newest)
        };

        let last_write = last_write
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_records,
            last_write,
            db_size_bytes,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM records WHERE key = ?1", [key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        trace!(key, found = value.is_some(), "read record");
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.conn()
            .execute(
                r"
                INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
                params![key, value, updated_at],
            )
            .map_err(|source| Error::Write {
                key: key.to_string(),
                source,
            })?;
        trace!(key, bytes = value.len(), "wrote record");
        Ok(())
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of records stored.
    pub total_records: i64,
    /// When the most recent write happened.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        assert!(SqliteStore::open_in_memory().is_ok());
    }

    #[test]
    fn test_get_missing_key() {
        let store = create_test_store();
        assert!(store.get("checklist:none").unwrap().is_none());
    }

    #[test]
    fn test_put_and_get() {
        let store = create_test_store();
        store.put("k", b"hello").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_put_overwrites() {
        let store = create_test_store();
        store.put("k", b"first").unwrap();
        store.put("k", b"second").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(store.stats().unwrap().total_records, 1);
    }

    #[test]
    fn test_keys_are_partitioned() {
        let store = create_test_store();
        store.put("checklist:a", b"a").unwrap();
        store.put("checklist:b", b"b").unwrap();

        assert_eq!(store.get("checklist:a").unwrap().as_deref(), Some(&b"a"[..]));
        assert_eq!(store.get("checklist:b").unwrap().as_deref(), Some(&b"b"[..]));
    }

    #[test]
    fn test_binary_and_empty_values() {
        let store = create_test_store();
        store.put("bin", &[0, 159, 146, 150, 255]).unwrap();
        store.put("empty", &[]).unwrap();

        assert_eq!(store.get("bin").unwrap().unwrap(), vec![0, 159, 146, 150, 255]);
        assert_eq!(store.get("empty").unwrap().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_count_with_prefix() {
        let store = create_test_store();
        store.put("checklist:a", b"a").unwrap();
        store.put("checklist:b", b"b").unwrap();
        store.put("catalog:aircraft", b"c").unwrap();
        store.put("checklist_x", b"x").unwrap();

        assert_eq!(store.count_with_prefix("checklist:").unwrap(), 2);
        assert_eq!(store.count_with_prefix("catalog:").unwrap(), 1);
        assert_eq!(store.count_with_prefix("checklist_").unwrap(), 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("checklist:"), "checklist:");
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_records, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        let before = Utc::now();
        store.put("one", b"1").unwrap();
        store.put("two", b"2").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 2);
        assert!(stats.last_write.unwrap() >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("wingspan.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.put("checklist:a", b"persisted").unwrap();
            assert_eq!(store.path(), db_path);
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            reopened.get("checklist:a").unwrap().as_deref(),
            Some(&b"persisted"[..])
        );
        assert!(reopened.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/wingspan.db");

        let _store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        let store = std::sync::Arc::new(create_test_store());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || store.put(&format!("k{i}"), b"v").unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.stats().unwrap().total_records, 4);
    }

    #[test]
    fn test_storage_stats_clone() {
        let stats = StorageStats {
            total_records: 5,
            last_write: None,
            db_size_bytes: 512,
        };
        assert_eq!(stats.clone(), stats);
    }
}
