//! JSONL-based journal storage backend.

use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{Storage, StoredStudy};
use crate::error::{Error, Result};
use crate::trial::Trial;
use crate::types::Direction;

/// One line of the journal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Record {
    CreateStudy { study: String, direction: Direction },
    Trial { study: String, trial: Trial },
}

/// A storage backend that appends every state change as a JSON line.
///
/// Each line is either a `create_study` or a `trial` record; replaying the
/// file keeps the last record per `(study, trial id)`. Every append holds an
/// exclusive `fs2` lock and is synced to disk before returning, reads hold a
/// shared lock. A trailing line without its newline is the remains of an
/// interrupted append and is skipped on load and cut on the next write.
///
/// # Examples
///
/// ```no_run
/// use latfit::storage::{JournalStorage, Storage};
///
/// let storage = JournalStorage::new("structure.jsonl");
/// let names = storage.study_names().unwrap();
/// ```
pub struct JournalStorage {
    path: PathBuf,
    /// Serialise in-process writes so we only hold the file lock briefly.
    write_lock: Mutex<()>,
}

impl JournalStorage {
    /// Creates a journal storage backed by the file at `path`.
    ///
    /// The file does not need to exist yet; it is created on the first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &Record) -> Result<()> {
        let line = serde_json::to_string(record).map_err(Error::storage)?;
        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(Error::storage)?;
        file.lock_exclusive().map_err(Error::storage)?;

        let result = repair_tail(&mut file).and_then(|()| {
            file.seek(SeekFrom::End(0)).map_err(Error::storage)?;
            file.write_all(line.as_bytes()).map_err(Error::storage)?;
            file.write_all(b"\n").map_err(Error::storage)?;
            file.flush().map_err(Error::storage)?;
            file.sync_data().map_err(Error::storage)
        });

        file.unlock().map_err(Error::storage)?;
        result
    }

    /// Replays the whole journal into per-study state.
    fn replay(&self) -> Result<BTreeMap<String, Replayed>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(Error::storage(e)),
        };

        file.lock_shared().map_err(Error::storage)?;
        let mut contents = String::new();
        let read = (&file).read_to_string(&mut contents);
        file.unlock().map_err(Error::storage)?;
        read.map_err(Error::storage)?;

        let mut studies: BTreeMap<String, Replayed> = BTreeMap::new();
        for record in parse_records(&contents)? {
            match record {
                Record::CreateStudy { study, direction } => {
                    studies.entry(study).or_insert_with(|| Replayed {
                        direction,
                        trials: HashMap::new(),
                    });
                }
                Record::Trial { study, trial } => {
                    let replayed = studies.get_mut(&study).ok_or_else(|| {
                        Error::Storage(format!(
                            "journal has trial #{} for unknown study '{study}'",
                            trial.id
                        ))
                    })?;
                    replayed.trials.insert(trial.id, trial);
                }
            }
        }
        Ok(studies)
    }
}

struct Replayed {
    direction: Direction,
    trials: HashMap<u64, Trial>,
}

impl Replayed {
    fn into_stored(self) -> StoredStudy {
        let mut trials: Vec<Trial> = self.trials.into_values().collect();
        trials.sort_by_key(|t| t.id);
        StoredStudy {
            direction: self.direction,
            trials,
        }
    }
}

/// Parses every complete line; an unterminated last line that does not
/// parse is dropped.
fn parse_records(contents: &str) -> Result<Vec<Record>> {
    let terminated = contents.ends_with('\n');
    let lines: Vec<&str> = contents.lines().collect();
    let mut records = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(record) => records.push(record),
            Err(_) if !terminated && i + 1 == lines.len() => {
                trace_warn!(line = i + 1, "skipping torn journal line");
            }
            Err(e) => {
                return Err(Error::Storage(format!("journal line {}: {e}", i + 1)));
            }
        }
    }
    Ok(records)
}

/// Makes sure the file ends on a line boundary before appending.
///
/// A complete but unterminated record gets its newline; a torn one is cut.
fn repair_tail(file: &mut File) -> Result<()> {
    let len = file.metadata().map_err(Error::storage)?.len();
    if len == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).map_err(Error::storage)?;
    file.read_exact(&mut last).map_err(Error::storage)?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut contents = Vec::new();
    file.seek(SeekFrom::Start(0)).map_err(Error::storage)?;
    file.read_to_end(&mut contents).map_err(Error::storage)?;
    let start = contents
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    let tail = &contents[start..];

    if serde_json::from_slice::<Record>(tail).is_ok() {
        file.seek(SeekFrom::End(0)).map_err(Error::storage)?;
        file.write_all(b"\n").map_err(Error::storage)?;
    } else {
        trace_warn!(bytes = tail.len(), "cutting torn journal tail");
        file.set_len(start as u64).map_err(Error::storage)?;
    }
    Ok(())
}

impl Storage for JournalStorage {
    fn load_study(&self, name: &str) -> Result<Option<StoredStudy>> {
        Ok(self.replay()?.remove(name).map(Replayed::into_stored))
    }

    fn create_study(&self, name: &str, direction: Direction) -> Result<()> {
        self.append(&Record::CreateStudy {
            study: name.to_string(),
            direction,
        })
    }

    fn write_trial(&self, study: &str, trial: &Trial) -> Result<()> {
        self.append(&Record::Trial {
            study: study.to_string(),
            trial: trial.clone(),
        })
    }

    fn study_names(&self) -> Result<Vec<String>> {
        Ok(self.replay()?.into_keys().collect())
    }
}
