//! Study implementation: the durable trial log and the optimization loop.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::sampler::Sampler;
use crate::sampler::tpe::TpeSampler;
use crate::search_space::SearchSpace;
use crate::storage::Storage;
use crate::trial::Trial;
use crate::types::{Direction, ParamSet, TrialState};

mod analysis;
mod builder;
mod export;
mod optimize;

pub use builder::StudyBuilder;

/// Reason recorded on trials found `Running` when a study is reopened.
pub(crate) const INTERRUPTED: &str = "interrupted";

/// A named, resumable optimization study.
///
/// A study pairs a [`SearchSpace`], a [`Sampler`] and a [`Storage`] backend.
/// It keeps an in-memory mirror of its trials that always matches what was
/// last written to storage: every state change is persisted first and only
/// then applied to the mirror.
///
/// Trials move `Running` → `Complete` | `Failed` exactly once and at most
/// one trial is `Running` at any time.
///
/// # Examples
///
/// ```
/// use latfit::{Direction, SearchSpace, Study};
///
/// let space = SearchSpace::builder().float("a", 0.0, 1.0).build().unwrap();
/// let study = Study::builder()
///     .name("demo")
///     .maximize()
///     .search_space(space)
///     .open()
///     .unwrap();
/// assert_eq!(study.direction(), Direction::Maximize);
/// assert_eq!(study.n_trials(), 0);
/// ```
pub struct Study {
    name: String,
    direction: Direction,
    space: SearchSpace,
    sampler: Arc<dyn Sampler>,
    storage: Arc<dyn Storage>,
    trials: RwLock<Vec<Trial>>,
    max_attempts: Option<usize>,
    stop: StopHandle,
}

impl Study {
    /// Return a [`StudyBuilder`] for constructing a study with a fluent API.
    #[must_use]
    pub fn builder() -> StudyBuilder {
        StudyBuilder::new()
    }

    /// Loads the study `name` from `storage`, or creates it if absent, using
    /// the default [`TpeSampler`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectionMismatch`] if the stored study was created
    /// with a different direction, or a storage error.
    pub fn open_or_create(
        name: &str,
        direction: Direction,
        space: SearchSpace,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        Self::open_with(
            name.to_string(),
            direction,
            space,
            Arc::new(TpeSampler::new()),
            storage,
            None,
        )
    }

    pub(crate) fn open_with(
        name: String,
        direction: Direction,
        space: SearchSpace,
        sampler: Arc<dyn Sampler>,
        storage: Arc<dyn Storage>,
        max_attempts: Option<usize>,
    ) -> Result<Self> {
        let trials = match storage.load_study(&name)? {
            Some(stored) => {
                if stored.direction != direction {
                    return Err(Error::DirectionMismatch {
                        study: name,
                        stored: stored.direction,
                        requested: direction,
                    });
                }
                let mut trials = stored.trials;
                for trial in trials.iter_mut().filter(|t| t.state == TrialState::Running) {
                    let mut recovered = trial.clone();
                    recovered.fail(INTERRUPTED)?;
                    storage.write_trial(&name, &recovered)?;
                    trace_warn!(study = %name, trial_id = trial.id, "recovered interrupted trial");
                    *trial = recovered;
                }
                trace_info!(study = %name, n_trials = trials.len(), "study resumed");
                trials
            }
            None => {
                storage.create_study(&name, direction)?;
                trace_info!(study = %name, direction = direction.as_str(), "study created");
                Vec::new()
            }
        };

        Ok(Self {
            name,
            direction,
            space,
            sampler,
            storage,
            trials: RwLock::new(trials),
            max_attempts,
            stop: StopHandle::default(),
        })
    }

    /// The study name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The search space every trial's parameters are drawn from.
    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.space
    }

    /// A handle that asks a running [`optimize`](Self::optimize) to stop
    /// before its next trial.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Starts a new trial with `params` (clamped into the search space) and
    /// returns its id.
    ///
    /// The `Running` record is durable before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialAlreadyRunning`] if another trial is still
    /// running, a parameter error if `params` does not match the search
    /// space, or a storage error.
    pub fn begin_trial(&self, params: ParamSet) -> Result<u64> {
        let params = if self.space.contains(&params) {
            params
        } else {
            self.space.clamp(&params)?
        };
        let mut trials = self.trials.write();
        if let Some(running) = trials.iter().find(|t| t.state == TrialState::Running) {
            return Err(Error::TrialAlreadyRunning { id: running.id });
        }
        let id = trials.last().map_or(0, |t| t.id + 1);
        let trial = Trial::new(id, params);
        self.storage.write_trial(&self.name, &trial)?;
        trials.push(trial);
        trace_debug!(trial_id = id, "trial started");
        Ok(id)
    }

    /// Records `value` for the running trial `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialNotFound`] / [`Error::TrialNotRunning`] for an
    /// unknown or already finished trial, [`Error::Evaluation`] if `value`
    /// is not finite, or a storage error.
    pub fn complete_trial(&self, id: u64, value: f64) -> Result<()> {
        self.finish(id, |trial| {
            if value.is_finite() {
                trial.complete(value)
            } else {
                Err(Error::Evaluation {
                    params: trial.params.clone(),
                    message: format!("non-finite value {value}"),
                })
            }
        })
        .map(drop)
    }

    /// Marks the running trial `id` as failed with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialNotFound`] / [`Error::TrialNotRunning`] for an
    /// unknown or already finished trial, or a storage error.
    pub fn fail_trial(&self, id: u64, reason: impl Into<String>) -> Result<()> {
        let reason = reason.into();
        self.finish(id, |trial| trial.fail(reason)).map(drop)
    }

    /// Applies a terminal transition to a copy of trial `id`, persists it,
    /// then swaps it into the mirror.
    pub(crate) fn finish(
        &self,
        id: u64,
        transition: impl FnOnce(&mut Trial) -> Result<()>,
    ) -> Result<Trial> {
        let mut trials = self.trials.write();
        let slot = trials
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::TrialNotFound { id })?;
        let mut updated = slot.clone();
        transition(&mut updated)?;
        self.storage.write_trial(&self.name, &updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    /// All trials in id order.
    #[must_use]
    pub fn history(&self) -> Vec<Trial> {
        self.trials.read().clone()
    }

    /// Returns a copy of trial `id`, if it exists.
    #[must_use]
    pub fn trial(&self, id: u64) -> Option<Trial> {
        self.trials.read().iter().find(|t| t.id == id).cloned()
    }

    /// Proposes the next parameter set from the current history.
    pub(crate) fn propose(&self) -> ParamSet {
        let trials = self.trials.read();
        self.sampler.propose(&self.space, self.direction, &trials)
    }
}

/// A cloneable flag that stops [`Study::optimize`] between trials.
///
/// The request is honored before the next trial is asked for, never during
/// an evaluation, and is cleared once observed.
///
/// # Examples
///
/// ```
/// use latfit::prelude::*;
///
/// let space = SearchSpace::builder().float("x", 0.0, 1.0).build().unwrap();
/// let study = Study::builder().search_space(space).open().unwrap();
/// let stop = study.stop_handle();
///
/// stop.stop();
/// study.optimize(10, |p: &ParamSet| Ok::<_, Error>(p["x"])).unwrap();
/// assert_eq!(study.n_trials(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if a stop was requested and not yet observed.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consumes a pending request.
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
