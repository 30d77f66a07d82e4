use core::any::Any;
use core::ops::ControlFlow;
use core::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::trial::{PendingTrial, Trial};
use crate::types::{ParamSet, TrialState};

use super::Study;

/// Lower bound of the default attempt cap.
const MIN_ATTEMPTS: usize = 10;
/// Default attempts allowed per requested completion.
const ATTEMPTS_PER_TRIAL: usize = 10;

impl Study {
    /// Proposes parameters from the current history and starts a trial for
    /// them.
    ///
    /// Evaluate `pending.params` and report back with [`tell`](Self::tell).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialAlreadyRunning`] if the previous trial was not
    /// told, or a storage error.
    ///
    /// # Examples
    ///
    /// ```
    /// use latfit::{SearchSpace, Study, TrialState};
    ///
    /// let space = SearchSpace::builder().float("x", -1.0, 1.0).build().unwrap();
    /// let study = Study::builder().search_space(space).open().unwrap();
    ///
    /// let pending = study.ask().unwrap();
    /// let x = pending.params["x"];
    /// let trial = study.tell(pending.id, Ok(x * x)).unwrap();
    /// assert_eq!(trial.state, TrialState::Complete);
    /// ```
    pub fn ask(&self) -> Result<PendingTrial> {
        let candidate = self.propose();
        let params = self.space.clamp(&candidate)?;
        let id = self.begin_trial(params.clone())?;
        Ok(PendingTrial { id, params })
    }

    /// Records the outcome of trial `id` and returns the finished trial.
    ///
    /// `Err(reason)` and non-finite values both mark the trial failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialNotFound`] / [`Error::TrialNotRunning`] for an
    /// unknown or already finished trial, or a storage error.
    pub fn tell(&self, id: u64, outcome: core::result::Result<f64, String>) -> Result<Trial> {
        let trial = match outcome {
            Ok(value) if value.is_finite() => self.finish(id, |t| t.complete(value))?,
            Ok(value) => self.finish(id, |t| t.fail(format!("non-finite value {value}")))?,
            Err(reason) => self.finish(id, |t| t.fail(reason))?,
        };

        #[cfg(feature = "tracing")]
        match (trial.state, trial.value) {
            (TrialState::Complete, Some(value)) => {
                tracing::info!(trial_id = id, value, "trial completed");
                if self.best_trial().is_ok_and(|best| best.id == id) {
                    tracing::info!(trial_id = id, value, "new best value found");
                }
            }
            _ => {
                tracing::debug!(trial_id = id, reason = trial.error.as_deref(), "trial failed");
            }
        }

        Ok(trial)
    }

    /// Runs the ask → evaluate → tell loop until `n_trials` trials have
    /// completed during this call.
    ///
    /// Accepts any [`Objective`], including plain closures
    /// `Fn(&ParamSet) -> Result<f64, E>`. An objective that returns an
    /// error, returns a non-finite value or panics fails only its own trial.
    /// Failed trials count toward the attempt cap (see
    /// [`StudyBuilder::max_attempts`](super::StudyBuilder::max_attempts)) but
    /// not toward `n_trials`.
    ///
    /// The loop also ends early, with `Ok(())`, when the
    /// [`StopHandle`](super::StopHandle) is triggered or a hook of the
    /// objective returns `ControlFlow::Break`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExhaustedAttempts`] when the cap is reached before
    /// `n_trials` completions, or a storage error. Every trial recorded so
    /// far stays in storage either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use latfit::{Error, ParamSet, SearchSpace, Study, TrialState};
    ///
    /// let space = SearchSpace::builder().float("x", 0.0, 1.0).build().unwrap();
    /// let study = Study::builder().maximize().search_space(space).open().unwrap();
    ///
    /// study
    ///     .optimize(5, |p: &ParamSet| {
    ///         if p["x"] > 0.9 {
    ///             return Err("out of range".to_string());
    ///         }
    ///         Ok(p["x"])
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(study.trials_by_state(TrialState::Complete).len(), 5);
    /// ```
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize(&self, n_trials: usize, objective: impl Objective) -> Result<()> {
        let max_attempts = self
            .max_attempts
            .unwrap_or_else(|| n_trials.saturating_mul(ATTEMPTS_PER_TRIAL).max(MIN_ATTEMPTS));

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "optimize",
            study = %self.name,
            n_trials,
            max_attempts,
            direction = self.direction.as_str()
        )
        .entered();

        let mut completed = 0;
        let mut attempts = 0;
        while completed < n_trials {
            if self.stop.take() {
                trace_info!(completed, "stop requested");
                break;
            }
            if attempts >= max_attempts {
                trace_warn!(attempts, completed, "attempt cap reached");
                return Err(Error::ExhaustedAttempts {
                    attempts,
                    completed,
                    requested: n_trials,
                });
            }
            if let ControlFlow::Break(()) = objective.before_trial(self) {
                break;
            }

            let pending = self.ask()?;
            attempts += 1;
            let outcome = evaluate_guarded(&objective, &pending.params);
            let trial = self.tell(pending.id, outcome)?;
            if trial.state == TrialState::Complete {
                completed += 1;
            }

            if let ControlFlow::Break(()) = objective.after_trial(self, &trial) {
                break;
            }
        }

        Ok(())
    }
}

/// Calls the objective, turning errors and panics into a failure reason.
fn evaluate_guarded<O: Objective>(
    objective: &O,
    params: &ParamSet,
) -> core::result::Result<f64, String> {
    match catch_unwind(AssertUnwindSafe(|| objective.evaluate(params))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
