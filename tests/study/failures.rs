use latfit::prelude::*;

use super::unit_space;

#[test]
fn test_failing_region_is_recorded_not_fatal() {
    let study = Study::builder()
        .maximize()
        .search_space(unit_space())
        .sampler(TpeSampler::builder().seed(9).build().unwrap())
        .open()
        .unwrap();

    study
        .optimize(40, |p: &ParamSet| {
            let a = p["a"];
            if a > 0.9 {
                return Err(format!("unstable at a={a}"));
            }
            Ok(a)
        })
        .unwrap();

    assert_eq!(study.trials_by_state(TrialState::Complete).len(), 40);
    for trial in study.trials_by_state(TrialState::Failed) {
        assert!(trial.params["a"] > 0.9);
        assert!(trial.value.is_none());
        assert!(trial.error.unwrap().starts_with("unstable"));
    }

    let best = study.best_trial().unwrap();
    assert_eq!(best.state, TrialState::Complete);
    assert!(best.params["a"] <= 0.9);
}

#[test]
fn test_panicking_objective_fails_only_its_trial() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();

    study
        .optimize(10, |p: &ParamSet| {
            assert!(p["a"] <= 0.5, "objective blew up");
            Ok::<_, Error>(p["a"])
        })
        .unwrap();

    for trial in study.trials_by_state(TrialState::Failed) {
        assert!(trial.error.unwrap().starts_with("panicked: objective blew up"));
    }
    assert_eq!(study.trials_by_state(TrialState::Complete).len(), 10);
}

#[test]
fn test_non_finite_values_are_failures() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();

    study
        .optimize(5, |p: &ParamSet| {
            Ok::<_, Error>(if p["a"] < 0.5 { f64::NAN } else { p["a"] })
        })
        .unwrap();

    for trial in study.trials_by_state(TrialState::Failed) {
        assert!(trial.params["a"] < 0.5);
        assert!(trial.error.unwrap().contains("non-finite"));
    }
}

#[test]
fn test_broken_objective_exhausts_attempts() {
    let study = Study::builder()
        .search_space(unit_space())
        .max_attempts(7)
        .open()
        .unwrap();

    let err = study
        .optimize(3, |_: &ParamSet| Err::<f64, _>("always broken"))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ExhaustedAttempts {
            attempts: 7,
            completed: 0,
            requested: 3
        }
    ));
    assert!(err.is_fatal());
    assert_eq!(study.n_trials(), 7);
    assert!(study.trials_by_state(TrialState::Running).is_empty());
}

#[test]
fn test_default_attempt_cap_scales_with_request() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();

    let err = study
        .optimize(2, |_: &ParamSet| Err::<f64, _>("always broken"))
        .unwrap_err();

    // max(10, 10 * 2) attempts.
    assert!(matches!(err, Error::ExhaustedAttempts { attempts: 20, .. }));
}

#[test]
fn test_evaluation_error_kind() {
    let err = Error::Evaluation {
        params: ParamSet::new(),
        message: "degenerate lattice".to_string(),
    };
    assert_eq!(err.kind(), ErrorKind::Evaluation);
    assert!(!err.is_fatal());
}
