//! Trial storage backends.
//!
//! The [`Storage`] trait defines how studies and their trials are persisted
//! and retrieved. Every [`Study`](crate::Study) owns an `Arc<dyn Storage>`
//! and keeps an in-memory mirror of its own trials; the backend only has to
//! store records durably and hand them back on the next open.
//!
//! # Available backends
//!
//! | Backend | Description | Feature flag |
//! |---------|-------------|-------------|
//! | [`MemoryStorage`] | `HashMap` behind a read-write lock, lives as long as the value | — |
//! | `JournalStorage` | Append-only JSONL file with `fs2` file locking | `journal` |
//! | `SqliteStorage` | `SQLite` database in WAL mode | `sqlite` |
//!
//! # Storage locations
//!
//! [`open`] turns a location string into a backend:
//!
//! | Location | Backend |
//! |----------|---------|
//! | `:memory:` | [`MemoryStorage`] |
//! | `sqlite:///structure.db`, `sqlite://structure.db` | `SqliteStorage` |
//! | `journal://trials.jsonl`, `trials.jsonl` | `JournalStorage` |
//!
//! # Implementing a custom backend
//!
//! Implement the three methods of [`Storage`]. `write_trial` is an upsert
//! keyed by trial id and must be durable before it returns: the study relies
//! on a crash between two writes leaving the earlier record on disk.

#[cfg(feature = "journal")]
mod journal;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

#[cfg(feature = "journal")]
pub use journal::JournalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

use crate::error::{Error, Result};
use crate::trial::Trial;
use crate::types::Direction;

/// A study as it was last persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredStudy {
    /// The direction the study was created with.
    pub direction: Direction,
    /// Every trial of the study, ordered by id.
    pub trials: Vec<Trial>,
}

/// Trait for storing and retrieving studies and their trials.
///
/// Implementations must be `Send + Sync` so a storage can be shared between
/// several [`Study`](crate::Study) handles.
pub trait Storage: Send + Sync {
    /// Loads the study named `name`, or `None` if it was never created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be read.
    fn load_study(&self, name: &str) -> Result<Option<StoredStudy>>;

    /// Records a new, empty study.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the write fails.
    fn create_study(&self, name: &str, direction: Direction) -> Result<()>;

    /// Inserts or replaces the record of `trial` within study `study`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the study does not exist or the write fails.
    fn write_trial(&self, study: &str, trial: &Trial) -> Result<()>;

    /// Names of every study in the store, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be read.
    fn study_names(&self) -> Result<Vec<String>>;
}

/// Opens the storage backend a location string points to.
///
/// See the [module documentation](self) for the accepted forms.
///
/// # Errors
///
/// Returns [`Error::InvalidStorageLocation`] for an empty location or one
/// whose backend is not compiled in, and [`Error::Storage`] if the backend
/// fails to open.
///
/// # Examples
///
/// ```
/// let storage = latfit::storage::open(":memory:").unwrap();
/// assert!(storage.study_names().unwrap().is_empty());
/// ```
pub fn open(location: &str) -> Result<Arc<dyn Storage>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(Error::InvalidStorageLocation(location.to_string()));
    }
    if location == ":memory:" {
        return Ok(Arc::new(MemoryStorage::new()));
    }
    if let Some(path) = location
        .strip_prefix("sqlite:///")
        .or_else(|| location.strip_prefix("sqlite://"))
    {
        return open_sqlite(location, path);
    }
    let path = location.strip_prefix("journal://").unwrap_or(location);
    open_journal(location, path)
}

#[cfg(feature = "sqlite")]
fn open_sqlite(location: &str, path: &str) -> Result<Arc<dyn Storage>> {
    if path.is_empty() {
        return Err(Error::InvalidStorageLocation(location.to_string()));
    }
    Ok(Arc::new(SqliteStorage::new(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(location: &str, _path: &str) -> Result<Arc<dyn Storage>> {
    Err(Error::InvalidStorageLocation(location.to_string()))
}

#[cfg(feature = "journal")]
fn open_journal(location: &str, path: &str) -> Result<Arc<dyn Storage>> {
    if path.is_empty() {
        return Err(Error::InvalidStorageLocation(location.to_string()));
    }
    Ok(Arc::new(JournalStorage::new(path)))
}

#[cfg(not(feature = "journal"))]
fn open_journal(location: &str, _path: &str) -> Result<Arc<dyn Storage>> {
    Err(Error::InvalidStorageLocation(location.to_string()))
}
