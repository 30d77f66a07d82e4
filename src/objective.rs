//! The [`Objective`] trait defines what gets optimized.
//!
//! For simple closures, pass them directly to
//! [`Study::optimize`](crate::Study::optimize):
//!
//! ```
//! use latfit::prelude::*;
//!
//! let space = SearchSpace::builder().float("x", -10.0, 10.0).build().unwrap();
//! let study = Study::builder().minimize().search_space(space).open().unwrap();
//!
//! study
//!     .optimize(20, |params: &ParamSet| Ok::<_, Error>((params["x"] - 3.0).powi(2)))
//!     .unwrap();
//! ```
//!
//! For early stopping, implement [`Objective`] on a struct and override the
//! hooks:
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use latfit::prelude::*;
//!
//! struct StopWhenClose {
//!     target: f64,
//! }
//!
//! impl Objective for StopWhenClose {
//!     type Error = Error;
//!
//!     fn evaluate(&self, params: &ParamSet) -> Result<f64> {
//!         Ok((params["x"] - 3.0).powi(2))
//!     }
//!
//!     fn after_trial(&self, _study: &Study, trial: &Trial) -> ControlFlow<()> {
//!         match trial.completed_value() {
//!             Some(v) if v < self.target => ControlFlow::Break(()),
//!             _ => ControlFlow::Continue(()),
//!         }
//!     }
//! }
//!
//! let space = SearchSpace::builder().float("x", -10.0, 10.0).build().unwrap();
//! let study = Study::builder().minimize().search_space(space).open().unwrap();
//! study.optimize(500, StopWhenClose { target: 1.0 }).unwrap();
//! assert!(study.best_value().unwrap() < 1.0);
//! ```

use core::ops::ControlFlow;

use crate::error::Error;
use crate::study::Study;
use crate::trial::Trial;
use crate::types::ParamSet;

/// Defines an objective function with lifecycle hooks for optimization.
///
/// The only required method is [`evaluate`](Objective::evaluate). The
/// optional hooks [`before_trial`](Objective::before_trial) and
/// [`after_trial`](Objective::after_trial) can break out of the loop.
///
/// Every closure `Fn(&ParamSet) -> Result<f64, E>` is an objective through a
/// blanket impl.
pub trait Objective {
    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error: ToString + 'static;

    /// Evaluate the objective for one parameter set.
    ///
    /// # Errors
    ///
    /// Any error whose type implements `ToString`. The trial is recorded as
    /// failed with the error text and the loop continues.
    fn evaluate(&self, params: &ParamSet) -> Result<f64, Self::Error>;

    /// Called before each trial is asked for.
    ///
    /// Return `ControlFlow::Break(())` to stop before the next trial starts.
    fn before_trial(&self, _study: &Study) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after each trial reached a terminal state, complete or failed.
    ///
    /// Return `ControlFlow::Break(())` to stop the optimization loop.
    fn after_trial(&self, _study: &Study, _trial: &Trial) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, E> Objective for F
where
    F: Fn(&ParamSet) -> Result<f64, E>,
    E: ToString + 'static,
{
    type Error = E;

    fn evaluate(&self, params: &ParamSet) -> Result<f64, E> {
        self(params)
    }
}

type SimulateFn<C> = Box<dyn Fn(&ParamSet) -> Result<C, String>>;
type ScoreFn<C> = Box<dyn Fn(&C, &C) -> Result<f64, String>>;

/// Wraps an expensive `simulate` step and a `score` comparison against a
/// fixed reference into one objective.
///
/// Errors from either step, and a non-finite score, come back as
/// [`Error::Evaluation`] carrying the parameters that were evaluated.
///
/// # Examples
///
/// ```
/// use latfit::{Objective, ParamSet, SimulationObjective};
///
/// let objective = SimulationObjective::new(
///     vec![1.0, 2.0],
///     |p: &ParamSet| Ok::<_, String>(vec![p["s"], 2.0 * p["s"]]),
///     |a: &Vec<f64>, b: &Vec<f64>| {
///         Ok::<_, String>(-a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>())
///     },
/// );
/// let params = ParamSet::from([("s".to_string(), 1.0)]);
/// assert_eq!(objective.evaluate(&params).unwrap(), 0.0);
/// ```
pub struct SimulationObjective<C> {
    simulate: SimulateFn<C>,
    score: ScoreFn<C>,
    reference: C,
}

impl<C: 'static> SimulationObjective<C> {
    /// Creates the objective from a reference output, a simulator and a
    /// scoring function called as `score(&simulated, &reference)`.
    pub fn new<S, Sc, E1, E2>(reference: C, simulate: S, score: Sc) -> Self
    where
        S: Fn(&ParamSet) -> Result<C, E1> + 'static,
        Sc: Fn(&C, &C) -> Result<f64, E2> + 'static,
        E1: ToString,
        E2: ToString,
    {
        Self {
            simulate: Box::new(move |p: &ParamSet| simulate(p).map_err(|e| e.to_string())),
            score: Box::new(move |a: &C, b: &C| score(a, b).map_err(|e| e.to_string())),
            reference,
        }
    }

    /// The reference output every simulation is scored against.
    #[must_use]
    pub fn reference(&self) -> &C {
        &self.reference
    }
}

impl<C> Objective for SimulationObjective<C> {
    type Error = Error;

    fn evaluate(&self, params: &ParamSet) -> Result<f64, Error> {
        let failed = |message: String| Error::Evaluation {
            params: params.clone(),
            message,
        };

        let simulated = (self.simulate)(params).map_err(|e| failed(format!("simulation: {e}")))?;
        let score = (self.score)(&simulated, &self.reference)
            .map_err(|e| failed(format!("scoring: {e}")))?;
        if score.is_finite() {
            Ok(score)
        } else {
            Err(failed(format!("non-finite score {score}")))
        }
    }
}
