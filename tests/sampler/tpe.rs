use latfit::prelude::*;

use super::completed;

fn history_on(space: &SearchSpace, n: u64, f: impl Fn(&ParamSet) -> f64) -> Vec<Trial> {
    let warmup = RandomSampler::with_seed(99);
    (0..n)
        .map(|id| {
            let params = warmup.propose(space, Direction::Maximize, &[]);
            let value = f(&params);
            completed(id, params, value)
        })
        .collect()
}

#[test]
fn test_tpe_candidates_respect_bounds() {
    let space = SearchSpace::builder()
        .float("a", 18.0, 26.0)
        .float("c", 3.0, 6.0)
        .float("alpha", 60.0, 120.0)
        .build()
        .unwrap();
    // Optimum pinned to the corner so the good KDE pushes past the bounds.
    let history = history_on(&space, 40, |p| p["a"] + p["c"] - p["alpha"]);
    let sampler = TpeSampler::builder().seed(1).build().unwrap();

    for _ in 0..200 {
        let candidate = sampler.propose(&space, Direction::Maximize, &history);
        assert!(
            space.contains(&candidate),
            "candidate {candidate:?} outside the search space"
        );
    }
}

#[test]
fn test_tpe_warmup_is_uniform() {
    let space = super::unit_space();
    let sampler = TpeSampler::builder()
        .n_startup_trials(10)
        .seed(5)
        .build()
        .unwrap();
    // Nine completed trials, all near 0.1: still below warmup.
    let history: Vec<Trial> = (0..9)
        .map(|id| {
            completed(
                id,
                ParamSet::from([("a".to_string(), 0.1)]),
                f64::from(u32::try_from(id).unwrap()),
            )
        })
        .collect();

    let n = 4000;
    let mut bins = [0usize; 10];
    for _ in 0..n {
        let a = sampler.propose(&space, Direction::Maximize, &history)["a"];
        bins[((a * 10.0) as usize).min(9)] += 1;
    }

    let expected = n as f64 / 10.0;
    for (i, &count) in bins.iter().enumerate() {
        let deviation = (count as f64 - expected).abs() / expected;
        assert!(
            deviation < 0.2,
            "bin {i} has {count} draws, expected about {expected}"
        );
    }
}

#[test]
fn test_tpe_failed_trials_do_not_end_warmup() {
    let space = super::unit_space();
    let sampler = TpeSampler::builder()
        .n_startup_trials(3)
        .seed(11)
        .build()
        .unwrap();
    let failed: Vec<Trial> = (0..50)
        .map(|id| Trial {
            id,
            params: ParamSet::from([("a".to_string(), 0.5)]),
            state: TrialState::Failed,
            value: None,
            error: Some("boom".to_string()),
        })
        .collect();

    // With only failures the sampler stays uniform instead of fitting.
    let draws: Vec<f64> = (0..200)
        .map(|_| sampler.propose(&space, Direction::Maximize, &failed)["a"])
        .collect();
    assert!(draws.iter().any(|&a| a < 0.2));
    assert!(draws.iter().any(|&a| a > 0.8));
}

#[test]
fn test_tpe_same_seed_same_proposals() {
    let space = SearchSpace::builder()
        .float("x", -5.0, 5.0)
        .float("y", -5.0, 5.0)
        .build()
        .unwrap();
    let history = history_on(&space, 30, |p| -(p["x"] * p["x"] + p["y"] * p["y"]));

    let proposals = |seed| {
        let sampler = TpeSampler::builder().seed(seed).build().unwrap();
        (0..10)
            .map(|_| sampler.propose(&space, Direction::Maximize, &history))
            .collect::<Vec<_>>()
    };

    assert_eq!(proposals(42), proposals(42));
}

#[test]
fn test_tpe_converges_on_one_dimensional_maximum() {
    let sampler = TpeSampler::builder().seed(42).build().unwrap();
    let study = Study::builder()
        .maximize()
        .search_space(super::unit_space())
        .sampler(sampler)
        .open()
        .unwrap();

    study
        .optimize(50, |p: &ParamSet| Ok::<_, Error>(-(p["a"] - 0.7).powi(2)))
        .unwrap();

    let best = study.best_params().unwrap()["a"];
    assert!((best - 0.7).abs() < 0.05, "best a = {best}, expected near 0.7");
}

#[test]
fn test_tpe_minimizes_multivariate_function() {
    // Minimize f(x, y) = x^2 + y^2 where x, y in [-5, 5]
    let sampler = TpeSampler::builder()
        .seed(123)
        .n_startup_trials(10)
        .build()
        .unwrap();
    let space = SearchSpace::builder()
        .float("x", -5.0, 5.0)
        .float("y", -5.0, 5.0)
        .build()
        .unwrap();
    let study = Study::builder()
        .minimize()
        .search_space(space)
        .sampler(sampler)
        .open()
        .unwrap();

    study
        .optimize(100, |p: &ParamSet| {
            Ok::<_, Error>(p["x"] * p["x"] + p["y"] * p["y"])
        })
        .unwrap();

    let best = study.best_value().unwrap();
    assert!(best < 2.0, "TPE should find near-optimal: best value {best}");
}

#[test]
fn test_tpe_beats_random_on_average() {
    let space = SearchSpace::builder()
        .float("x", -10.0, 10.0)
        .build()
        .unwrap();
    let objective = |p: &ParamSet| Ok::<_, Error>((p["x"] - 3.0).powi(2));

    let mut tpe_total = 0.0;
    let mut random_total = 0.0;
    for seed in 0..5 {
        let tpe = Study::builder()
            .minimize()
            .search_space(space.clone())
            .sampler(TpeSampler::builder().seed(seed).build().unwrap())
            .open()
            .unwrap();
        tpe.optimize(60, objective).unwrap();
        tpe_total += tpe.best_value().unwrap();

        let random = Study::builder()
            .minimize()
            .search_space(space.clone())
            .sampler(RandomSampler::with_seed(seed))
            .open()
            .unwrap();
        random.optimize(60, objective).unwrap();
        random_total += random.best_value().unwrap();
    }

    assert!(
        tpe_total <= random_total,
        "tpe {tpe_total} should not be worse than random {random_total}"
    );
}

#[test]
fn test_tpe_builder_rejects_invalid_settings() {
    assert!(matches!(
        TpeSampler::builder().gamma(1.5).build(),
        Err(Error::InvalidGamma(_))
    ));
    assert!(matches!(
        TpeSampler::builder().kde_bandwidth(-1.0).build(),
        Err(Error::InvalidBandwidth(_))
    ));
    assert!(matches!(
        TpeSampler::builder().n_ei_candidates(0).build(),
        Err(Error::InvalidCandidateCount)
    ));
}
