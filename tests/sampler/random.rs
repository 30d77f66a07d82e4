use latfit::prelude::*;

#[test]
fn test_random_sampler_uniform_float_distribution() {
    let space = super::unit_space();
    let sampler = RandomSampler::with_seed(42);

    let n_samples = 1000;
    let mut samples: Vec<f64> = (0..n_samples)
        .map(|_| sampler.propose(&space, Direction::Maximize, &[])["a"])
        .collect();

    // All samples should be in range
    for &s in &samples {
        assert!((0.0..=1.0).contains(&s), "sample {s} out of range [0, 1]");
    }

    // Check distribution is roughly uniform by looking at quartiles
    samples.sort_by(f64::total_cmp);

    let q1 = samples[n_samples / 4];
    let q2 = samples[n_samples / 2];
    let q3 = samples[3 * n_samples / 4];

    assert!((q1 - 0.25).abs() < 0.1, "Q1 {q1} should be close to 0.25");
    assert!(
        (q2 - 0.5).abs() < 0.1,
        "Q2 (median) {q2} should be close to 0.5"
    );
    assert!((q3 - 0.75).abs() < 0.1, "Q3 {q3} should be close to 0.75");
}

#[test]
fn test_random_sampler_reproducible_with_seed() {
    let space = SearchSpace::builder()
        .float("a", 18.0, 26.0)
        .float("gamma", 60.0, 120.0)
        .build()
        .unwrap();

    let draw = |seed| {
        let sampler = RandomSampler::with_seed(seed);
        (0..20)
            .map(|_| sampler.propose(&space, Direction::Maximize, &[]))
            .collect::<Vec<_>>()
    };

    assert_eq!(draw(7), draw(7));
    assert_ne!(draw(7), draw(8));
}

#[test]
fn test_random_sampler_in_study() {
    let study = Study::builder()
        .search_space(super::unit_space())
        .sampler(RandomSampler::with_seed(3))
        .open()
        .unwrap();

    study
        .optimize(25, |p: &ParamSet| Ok::<_, Error>(p["a"]))
        .unwrap();

    assert_eq!(study.n_trials(), 25);
    for trial in study.history() {
        assert!(study.search_space().contains(&trial.params));
    }
}
