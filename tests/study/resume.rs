use std::sync::Arc;

use latfit::prelude::*;
use latfit::storage;

use super::unit_space;

fn open(storage: &Arc<dyn Storage>, seed: u64) -> Study {
    Study::builder()
        .name("resume")
        .maximize()
        .search_space(unit_space())
        .sampler(TpeSampler::builder().seed(seed).build().unwrap())
        .shared_storage(Arc::clone(storage))
        .open()
        .unwrap()
}

fn objective(p: &ParamSet) -> Result<f64> {
    Ok(-(p["a"] - 0.7).powi(2))
}

#[test]
fn test_resume_concatenates_history() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let first = open(&storage, 1);
    first.optimize(5, objective).unwrap();
    let before = first.history();
    drop(first);

    let second = open(&storage, 2);
    assert_eq!(second.history(), before);
    second.optimize(7, objective).unwrap();

    let after = second.history();
    assert_eq!(after.len(), 12);
    assert_eq!(&after[..5], &before[..]);
    let ids: Vec<u64> = after.iter().map(|t| t.id).collect();
    assert_eq!(ids, (0..12).collect::<Vec<_>>());
}

#[test]
fn test_running_trial_is_recovered_as_interrupted() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let crashed = open(&storage, 1);
    crashed.optimize(3, objective).unwrap();
    let pending = crashed.ask().unwrap();
    drop(crashed);

    let resumed = open(&storage, 1);
    let trial = resumed.trial(pending.id).unwrap();
    assert_eq!(trial.state, TrialState::Failed);
    assert_eq!(trial.error.as_deref(), Some("interrupted"));
    assert_eq!(trial.params, pending.params);
    assert!(resumed.trials_by_state(TrialState::Running).is_empty());

    // The stale trial is never re-evaluated; numbering continues after it.
    assert_eq!(resumed.ask().unwrap().id, pending.id + 1);
}

#[test]
fn test_zero_trials_is_a_no_op() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let study = open(&storage, 4);
    study.optimize(6, objective).unwrap();
    let best = study.best_trial().unwrap();
    let history = study.history();

    study
        .optimize(0, |_: &ParamSet| -> Result<f64> { panic!("must not evaluate") })
        .unwrap();

    assert_eq!(study.history(), history);
    assert_eq!(study.best_trial().unwrap(), best);
}

#[test]
fn test_direction_mismatch_is_rejected() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    drop(open(&storage, 1));

    let err = Study::builder()
        .name("resume")
        .minimize()
        .search_space(unit_space())
        .shared_storage(Arc::clone(&storage))
        .open()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::DirectionMismatch {
            stored: Direction::Maximize,
            requested: Direction::Minimize,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_studies_sharing_storage_are_independent() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let first = open(&storage, 1);
    first.optimize(3, objective).unwrap();

    let other = Study::builder()
        .name("other")
        .search_space(unit_space())
        .shared_storage(Arc::clone(&storage))
        .open()
        .unwrap();
    assert_eq!(other.n_trials(), 0);
    assert_eq!(
        storage.study_names().unwrap(),
        vec!["other".to_string(), "resume".to_string()]
    );
}

#[cfg(feature = "journal")]
#[test]
fn test_resume_from_journal_file() {
    let path = super::temp_path("jsonl");
    let location = path.to_str().unwrap().to_string();

    {
        let study = open(&storage::open(&location).unwrap(), 1);
        study.optimize(4, objective).unwrap();
        study.ask().unwrap();
    }

    let study = open(&storage::open(&format!("journal://{location}")).unwrap(), 1);
    assert_eq!(study.n_trials(), 5);
    assert_eq!(study.trials_by_state(TrialState::Failed).len(), 1);
    study.optimize(2, objective).unwrap();
    assert_eq!(study.n_trials(), 7);

    std::fs::remove_file(&path).ok();
}

#[cfg(feature = "sqlite")]
#[test]
fn test_resume_from_sqlite_file() {
    let path = super::temp_path("db");
    let location = format!("sqlite:///{}", path.display());

    let before = {
        let study = open(&storage::open(&location).unwrap(), 1);
        study.optimize(4, objective).unwrap();
        study.history()
    };

    let study = open(&storage::open(&location).unwrap(), 1);
    assert_eq!(study.history(), before);

    std::fs::remove_file(&path).ok();
}
