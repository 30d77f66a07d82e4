//! One-call entry point: open or resume a study, optimize, report the best.

use crate::error::Result;
use crate::objective::Objective;
use crate::search_space::SearchSpace;
use crate::storage;
use crate::study::Study;
use crate::trial::Trial;
use crate::types::Direction;

/// Opens (or resumes) the maximizing study `study_name` at `storage_location`,
/// runs `n_trials` more successful evaluations with the default
/// [`TpeSampler`](crate::sampler::TpeSampler), and returns the best completed
/// trial of the whole study.
///
/// `storage_location` is interpreted by [`storage::open`]. With
/// `n_trials == 0` nothing is evaluated and the best existing trial is
/// returned unchanged.
///
/// # Errors
///
/// Returns a configuration error for an invalid location or a direction
/// mismatch, a storage error, [`Error::ExhaustedAttempts`](crate::Error::ExhaustedAttempts)
/// when the objective fails too often, or
/// [`Error::NoCompletedTrials`](crate::Error::NoCompletedTrials) when the
/// study has no completed trial to report.
///
/// # Examples
///
/// ```
/// use latfit::{Error, ParamSet, SearchSpace};
///
/// let space = SearchSpace::builder().float("a", 0.0, 1.0).build().unwrap();
/// let best = latfit::run("doc", ":memory:", 20, space, |p: &ParamSet| {
///     Ok::<_, Error>(-(p["a"] - 0.7).powi(2))
/// })
/// .unwrap();
/// assert!(best.value.unwrap() <= 0.0);
/// ```
pub fn run(
    study_name: &str,
    storage_location: &str,
    n_trials: usize,
    search_space: SearchSpace,
    objective: impl Objective,
) -> Result<Trial> {
    let storage = storage::open(storage_location)?;
    let study = Study::open_or_create(study_name, Direction::Maximize, search_space, storage)?;
    study.optimize(n_trials, objective)?;
    let best = study.best_trial()?;
    trace_info!(study = study_name, value = best.value, "optimization finished");
    Ok(best)
}
