use core::fmt::Write as _;

use crate::error::{Error, Result};
use crate::trial::Trial;
use crate::types::{ParamSet, TrialState};

use super::Study;

impl Study {
    /// Return the completed trial with the best objective value.
    ///
    /// Ties keep the trial with the lower id.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    ///
    /// # Examples
    ///
    /// ```
    /// use latfit::{ParamSet, SearchSpace, Study};
    ///
    /// let space = SearchSpace::builder().float("x", 0.0, 1.0).build().unwrap();
    /// let study = Study::builder().minimize().search_space(space).open().unwrap();
    ///
    /// // Error when no trials completed
    /// assert!(study.best_trial().is_err());
    ///
    /// for (x, value) in [(0.2, 0.8), (0.6, 0.3)] {
    ///     let id = study.begin_trial(ParamSet::from([("x".to_string(), x)])).unwrap();
    ///     study.complete_trial(id, value).unwrap();
    /// }
    ///
    /// let best = study.best_trial().unwrap();
    /// assert_eq!(best.value, Some(0.3)); // Minimize: lower is better
    /// ```
    pub fn best_trial(&self) -> Result<Trial> {
        let trials = self.trials.read();
        let mut best: Option<(&Trial, f64)> = None;
        for trial in trials.iter() {
            if let Some(value) = trial.completed_value()
                && best.is_none_or(|(_, incumbent)| self.direction.is_better(value, incumbent))
            {
                best = Some((trial, value));
            }
        }
        best.map(|(trial, _)| trial.clone())
            .ok_or(Error::NoCompletedTrials)
    }

    /// Return the best objective value found so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    pub fn best_value(&self) -> Result<f64> {
        self.best_trial()?
            .completed_value()
            .ok_or(Error::NoCompletedTrials)
    }

    /// Return the parameters of the best trial.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    pub fn best_params(&self) -> Result<ParamSet> {
        self.best_trial().map(|trial| trial.params)
    }

    /// Number of trials in the study, in any state.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.trials.read().len()
    }

    /// Trials in the given state, in id order.
    #[must_use]
    pub fn trials_by_state(&self, state: TrialState) -> Vec<Trial> {
        self.trials
            .read()
            .iter()
            .filter(|t| t.state == state)
            .cloned()
            .collect()
    }

    /// Return the top `n` completed trials, best first.
    ///
    /// If fewer than `n` completed trials exist, returns all of them.
    #[must_use]
    pub fn top_trials(&self, n: usize) -> Vec<Trial> {
        let mut completed = self.trials_by_state(TrialState::Complete);
        let direction = self.direction;
        completed.sort_by(|a, b| {
            direction.best_first(
                a.value.unwrap_or(f64::NAN),
                b.value.unwrap_or(f64::NAN),
            )
        });
        completed.truncate(n);
        completed
    }

    /// A stable, human-readable summary: direction, trial counts, and the
    /// best value with its parameters in name order.
    ///
    /// ```text
    /// Study: structure (maximize)
    /// Trials: 12 (complete: 10, failed: 2, running: 0)
    /// Best Score: 0.91
    ///   a = 20.5
    ///   b = 22.1
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let count = |state| self.trials.read().iter().filter(|t| t.state == state).count();
        let mut out = String::new();
        let _ = writeln!(out, "Study: {} ({})", self.name, self.direction.as_str());
        let _ = writeln!(
            out,
            "Trials: {} (complete: {}, failed: {}, running: {})",
            self.n_trials(),
            count(TrialState::Complete),
            count(TrialState::Failed),
            count(TrialState::Running),
        );
        match self.best_trial() {
            Ok(best) => {
                if let Some(value) = best.value {
                    let _ = writeln!(out, "Best Score: {value}");
                }
                for (name, value) in &best.params {
                    let _ = writeln!(out, "  {name} = {value}");
                }
            }
            Err(_) => {
                let _ = writeln!(out, "Best Score: none");
            }
        }
        out
    }
}
