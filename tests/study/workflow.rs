use latfit::prelude::*;

use super::unit_space;

#[test]
fn test_study_basic_workflow() {
    let study = Study::builder()
        .minimize()
        .search_space(SearchSpace::builder().float("x", -5.0, 5.0).build().unwrap())
        .open()
        .unwrap();

    study
        .optimize(10, |p: &ParamSet| Ok::<_, Error>(p["x"] * p["x"]))
        .expect("optimization should succeed");

    assert_eq!(study.n_trials(), 10);
    let best = study.best_trial().expect("should have best trial");
    assert!(best.value.unwrap() >= 0.0, "x^2 should be non-negative");
}

#[test]
fn test_ids_are_sequential_and_every_trial_finished() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    study
        .optimize(15, |p: &ParamSet| Ok::<_, Error>(p["a"]))
        .unwrap();

    let history = study.history();
    let ids: Vec<u64> = history.iter().map(|t| t.id).collect();
    assert_eq!(ids, (0..15).collect::<Vec<_>>());
    assert!(history.iter().all(Trial::is_finished));
}

#[test]
fn test_no_completed_trials_error() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();

    let result = study.best_trial();
    assert!(matches!(result, Err(Error::NoCompletedTrials)));
    assert_eq!(
        result.unwrap_err().kind(),
        ErrorKind::NoCompletedTrials
    );
}

#[test]
fn test_missing_search_space_is_configuration_error() {
    let err = Study::builder().name("nothing").open().err().unwrap();
    assert!(matches!(err, Error::MissingSearchSpace(ref name) if name == "nothing"));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_two_seeded_runs_produce_identical_histories() {
    let run = || {
        let study = Study::builder()
            .maximize()
            .search_space(
                SearchSpace::builder()
                    .float("a", 0.0, 1.0)
                    .float("b", -2.0, 2.0)
                    .build()
                    .unwrap(),
            )
            .sampler(TpeSampler::builder().seed(2024).build().unwrap())
            .open()
            .unwrap();
        study
            .optimize(30, |p: &ParamSet| {
                Ok::<_, Error>(-(p["a"] - 0.7).powi(2) - (p["b"] + 1.0).powi(2))
            })
            .unwrap();
        study.history()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_top_trials_and_summary() {
    let study = Study::builder()
        .name("structure")
        .maximize()
        .search_space(unit_space())
        .sampler(RandomSampler::with_seed(8))
        .open()
        .unwrap();
    study
        .optimize(12, |p: &ParamSet| Ok::<_, Error>(p["a"]))
        .unwrap();

    let top = study.top_trials(3);
    assert_eq!(top.len(), 3);
    assert!(top[0].value >= top[1].value && top[1].value >= top[2].value);
    assert_eq!(top[0].id, study.best_trial().unwrap().id);

    let summary = study.summary();
    assert!(summary.starts_with("Study: structure (maximize)\nTrials: 12 (complete: 12"));
    assert!(summary.contains(&format!("Best Score: {}", study.best_value().unwrap())));
}

#[test]
fn test_csv_export_has_one_row_per_trial() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    study
        .optimize(4, |p: &ParamSet| Ok::<_, Error>(p["a"]))
        .unwrap();

    let mut buf = Vec::new();
    study.to_csv(&mut buf).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "trial_id,state,value,a,error");
    assert_eq!(lines.len(), 5);
    assert!(lines[1..].iter().all(|l| l.contains(",complete,")));
}
