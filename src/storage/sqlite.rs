//! `SQLite`-backed storage backend.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

use super::{Storage, StoredStudy};
use crate::error::{Error, Result};
use crate::trial::Trial;
use crate::types::Direction;

/// A storage backend that persists studies and trials in a `SQLite` database.
///
/// WAL mode with `synchronous = FULL` makes every committed write durable
/// before the call returns. Trials are stored one row per `(study, trial id)`
/// as JSON, so a later state of the same trial replaces the earlier row.
///
/// # Examples
///
/// ```no_run
/// use latfit::storage::SqliteStorage;
///
/// let storage = SqliteStorage::new("structure.db").unwrap();
/// ```
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if the
    /// database cannot be opened or the schema cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::storage)?;

        // WAL mode: concurrent readers, single writer.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(Error::storage)?;
        conn.pragma_update(None, "synchronous", "FULL")
            .map_err(Error::storage)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS studies (
                name      TEXT PRIMARY KEY,
                direction TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trials (
                study    TEXT NOT NULL REFERENCES studies(name),
                trial_id INTEGER NOT NULL,
                state    TEXT NOT NULL,
                data     TEXT NOT NULL,
                PRIMARY KEY (study, trial_id)
            );",
        )
        .map_err(Error::storage)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn parse_direction(raw: &str) -> Result<Direction> {
    match raw {
        "minimize" => Ok(Direction::Minimize),
        "maximize" => Ok(Direction::Maximize),
        other => Err(Error::Storage(format!("unknown direction '{other}'"))),
    }
}

/// Load every trial of `study`, ordered by id.
fn load_trials(conn: &Connection, study: &str) -> Result<Vec<Trial>> {
    let mut stmt = conn
        .prepare("SELECT data FROM trials WHERE study = ?1 ORDER BY trial_id")
        .map_err(Error::storage)?;

    let rows = stmt
        .query_map([study], |row| row.get::<_, String>(0))
        .map_err(Error::storage)?;

    let mut trials = Vec::new();
    for row in rows {
        let data = row.map_err(Error::storage)?;
        let trial: Trial = serde_json::from_str(&data).map_err(Error::storage)?;
        trials.push(trial);
    }

    Ok(trials)
}

impl Storage for SqliteStorage {
    fn load_study(&self, name: &str) -> Result<Option<StoredStudy>> {
        let conn = self.conn.lock();
        let direction = conn
            .query_row(
                "SELECT direction FROM studies WHERE name = ?1",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(Error::storage)?;

        let Some(direction) = direction else {
            return Ok(None);
        };
        Ok(Some(StoredStudy {
            direction: parse_direction(&direction)?,
            trials: load_trials(&conn, name)?,
        }))
    }

    fn create_study(&self, name: &str, direction: Direction) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT OR IGNORE INTO studies (name, direction) VALUES (?1, ?2)",
                params![name, direction.as_str()],
            )
            .map_err(Error::storage)?;
        Ok(())
    }

    fn write_trial(&self, study: &str, trial: &Trial) -> Result<()> {
        let data = serde_json::to_string(trial).map_err(Error::storage)?;
        let id = i64::try_from(trial.id).map_err(Error::storage)?;

        let conn = self.conn.lock();
        let known: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM studies WHERE name = ?1)",
                [study],
                |row| row.get(0),
            )
            .map_err(Error::storage)?;
        if !known {
            return Err(Error::Storage(format!("study '{study}' does not exist")));
        }

        conn.execute(
            "INSERT OR REPLACE INTO trials (study, trial_id, state, data) VALUES (?1, ?2, ?3, ?4)",
            params![study, id, trial.state.as_str(), data],
        )
        .map_err(Error::storage)?;

        Ok(())
    }

    fn study_names(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT name FROM studies ORDER BY name")
            .map_err(Error::storage)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(Error::storage)?;
        rows.map(|row| row.map_err(Error::storage)).collect()
    }
}
