use latfit::prelude::*;

use super::unit_space;

#[test]
fn test_ask_tell_loop() {
    let study = Study::builder()
        .maximize()
        .search_space(unit_space())
        .open()
        .unwrap();

    for _ in 0..8 {
        let pending = study.ask().unwrap();
        assert!(study.search_space().contains(&pending.params));
        let value = pending.params["a"];
        let trial = study.tell(pending.id, Ok(value)).unwrap();
        assert_eq!(trial.completed_value(), Some(value));
    }
    assert_eq!(study.trials_by_state(TrialState::Complete).len(), 8);
}

#[test]
fn test_ask_twice_without_tell_is_rejected() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    let pending = study.ask().unwrap();

    let err = study.ask().unwrap_err();
    assert!(matches!(err, Error::TrialAlreadyRunning { id } if id == pending.id));
    assert_eq!(err.kind(), ErrorKind::Storage);

    study.tell(pending.id, Err("gave up".to_string())).unwrap();
    assert!(study.ask().is_ok());
}

#[test]
fn test_tell_twice_is_rejected() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    let pending = study.ask().unwrap();
    study.tell(pending.id, Ok(1.0)).unwrap();

    assert!(matches!(
        study.tell(pending.id, Ok(2.0)),
        Err(Error::TrialNotRunning {
            state: TrialState::Complete,
            ..
        })
    ));
    assert_eq!(study.trial(pending.id).unwrap().value, Some(1.0));
}

#[test]
fn test_tell_unknown_trial() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    assert!(matches!(
        study.tell(42, Ok(1.0)),
        Err(Error::TrialNotFound { id: 42 })
    ));
}

#[test]
fn test_begin_trial_rejects_foreign_parameters() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    let params = ParamSet::from([("a".to_string(), 0.5), ("z".to_string(), 1.0)]);
    assert!(matches!(
        study.begin_trial(params),
        Err(Error::UnknownParameter(ref name)) if name == "z"
    ));
    assert_eq!(study.n_trials(), 0);
}
