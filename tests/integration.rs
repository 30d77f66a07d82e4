//! End-to-end tests for the `run` entry point.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use latfit::{Error, ErrorKind, ParamSet, SearchSpace, TrialState};

fn temp_location() -> (std::path::PathBuf, String) {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "latfit_run_test_{}_{}.jsonl",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let location = format!("journal://{}", path.display());
    (path, location)
}

fn space() -> SearchSpace {
    SearchSpace::builder().float("a", 0.0, 1.0).build().unwrap()
}

fn quadratic(p: &ParamSet) -> Result<f64, Error> {
    Ok(-(p["a"] - 0.7).powi(2))
}

// =============================================================================
// Test: maximize a one-dimensional quadratic, best lands near the optimum
// =============================================================================

#[test]
fn test_run_finds_quadratic_maximum() {
    let best = latfit::run("quadratic", ":memory:", 50, space(), quadratic).unwrap();

    assert_eq!(best.state, TrialState::Complete);
    let a = best.params["a"];
    assert!((a - 0.7).abs() < 0.1, "best a = {a}");
}

// =============================================================================
// Test: resuming through a journal file, zero trials returns the stored best
// =============================================================================

#[cfg(feature = "journal")]
#[test]
fn test_run_resumes_and_zero_trials_is_idempotent() {
    let (path, location) = temp_location();

    let first = latfit::run("structure", &location, 10, space(), quadratic).unwrap();
    let second = latfit::run("structure", &location, 5, space(), quadratic).unwrap();
    assert!(second.value.unwrap() >= first.value.unwrap());

    let calls = AtomicUsize::new(0);
    let third = latfit::run("structure", &location, 0, space(), |p: &ParamSet| {
        calls.fetch_add(1, Ordering::Relaxed);
        quadratic(p)
    })
    .unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(third, second);

    let stored = latfit::storage::open(&location)
        .unwrap()
        .load_study("structure")
        .unwrap()
        .unwrap();
    let ids: Vec<u64> = stored.trials.iter().map(|t| t.id).collect();
    assert_eq!(ids, (0..15).collect::<Vec<_>>());

    std::fs::remove_file(&path).ok();
}

// =============================================================================
// Test: fatal errors surface with the right kind
// =============================================================================

#[test]
fn test_run_zero_trials_on_empty_study() {
    let err = latfit::run("empty", ":memory:", 0, space(), quadratic).unwrap_err();
    assert!(matches!(err, Error::NoCompletedTrials));
}

#[test]
fn test_run_rejects_empty_location() {
    let err = latfit::run("s", "", 5, space(), quadratic).unwrap_err();
    assert!(matches!(err, Error::InvalidStorageLocation(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_run_reports_exhausted_attempts() {
    let err = latfit::run("broken", ":memory:", 1, space(), |_: &ParamSet| {
        Err::<f64, _>("simulation diverged")
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExhaustedAttempts);
    assert!(err.to_string().starts_with("gave up after 10 attempts"));
}

#[test]
fn test_invalid_bounds_are_configuration_errors() {
    let err = SearchSpace::builder()
        .float("a", 26.0, 18.0)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = SearchSpace::builder()
        .float("a", f64::NEG_INFINITY, 1.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::NonFiniteBounds { .. }));
}
