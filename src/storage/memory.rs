use std::collections::HashMap;

use parking_lot::RwLock;

use super::{Storage, StoredStudy};
use crate::error::{Error, Result};
use crate::trial::Trial;
use crate::types::Direction;

/// In-memory storage.
///
/// Records survive as long as the value does. Share one instance (behind an
/// `Arc`) between studies to resume within a single process.
pub struct MemoryStorage {
    studies: RwLock<HashMap<String, StoredStudy>>,
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            studies: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn load_study(&self, name: &str) -> Result<Option<StoredStudy>> {
        Ok(self.studies.read().get(name).cloned())
    }

    fn create_study(&self, name: &str, direction: Direction) -> Result<()> {
        self.studies
            .write()
            .entry(name.to_string())
            .or_insert_with(|| StoredStudy {
                direction,
                trials: Vec::new(),
            });
        Ok(())
    }

    fn write_trial(&self, study: &str, trial: &Trial) -> Result<()> {
        let mut studies = self.studies.write();
        let stored = studies
            .get_mut(study)
            .ok_or_else(|| Error::Storage(format!("study '{study}' does not exist")))?;
        match stored.trials.binary_search_by_key(&trial.id, |t| t.id) {
            Ok(pos) => stored.trials[pos] = trial.clone(),
            Err(pos) => stored.trials.insert(pos, trial.clone()),
        }
        Ok(())
    }

    fn study_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.studies.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamSet, TrialState};

    #[test]
    fn test_write_trial_upserts_in_id_order() {
        let storage = MemoryStorage::new();
        storage.create_study("s", Direction::Minimize).unwrap();

        storage.write_trial("s", &Trial::new(1, ParamSet::new())).unwrap();
        storage.write_trial("s", &Trial::new(0, ParamSet::new())).unwrap();
        let mut done = Trial::new(1, ParamSet::new());
        done.complete(2.0).unwrap();
        storage.write_trial("s", &done).unwrap();

        let stored = storage.load_study("s").unwrap().unwrap();
        assert_eq!(stored.trials.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(stored.trials[1].state, TrialState::Complete);
    }

    #[test]
    fn test_write_to_unknown_study_fails() {
        let storage = MemoryStorage::new();
        let result = storage.write_trial("missing", &Trial::new(0, ParamSet::new()));
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_create_study_keeps_existing_records() {
        let storage = MemoryStorage::new();
        storage.create_study("s", Direction::Maximize).unwrap();
        storage.write_trial("s", &Trial::new(0, ParamSet::new())).unwrap();
        storage.create_study("s", Direction::Maximize).unwrap();
        assert_eq!(storage.load_study("s").unwrap().unwrap().trials.len(), 1);
    }
}
