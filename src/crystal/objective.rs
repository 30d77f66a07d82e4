//! Scoring lattice candidates against the measured pattern.

use core::fmt::Display;

use super::lattice::LatticeParameters;
use super::signal::{Curve, cosine_similarity};
use super::structure::Structure;
use crate::error::{Error, Result};
use crate::objective::{Objective, SimulationObjective};
use crate::types::ParamSet;

/// A forward simulator turning a unit cell and its atoms into a predicted
/// diffraction curve.
///
/// The curve must be sampled on the same 2θ grid as the reference pattern.
pub trait ForwardModel {
    /// Error returned when a simulation fails.
    type Error: Display;

    /// Simulates the pattern of `structure` in the cell `lattice`.
    ///
    /// # Errors
    ///
    /// Any simulator failure; the trial is recorded as failed.
    fn simulate(
        &self,
        lattice: &LatticeParameters,
        structure: &Structure,
    ) -> core::result::Result<Curve, Self::Error>;
}

/// Objective that simulates a candidate lattice and scores it by cosine
/// similarity against the reference pattern.
///
/// Candidates whose six constants do not form a cell fail without calling
/// the model. Every failure is an [`Error::Evaluation`] carrying the
/// candidate's parameters.
pub struct XrdObjective {
    inner: SimulationObjective<Curve>,
}

impl XrdObjective {
    /// Creates the objective for `structure` measured as `reference`.
    pub fn new<M>(model: M, structure: Structure, reference: Curve) -> Self
    where
        M: ForwardModel + 'static,
    {
        let simulate =
            move |params: &ParamSet| -> core::result::Result<Curve, String> {
                let lattice = LatticeParameters::from_params(params).map_err(|e| e.to_string())?;
                lattice.volume().map_err(|e| e.to_string())?;
                model
                    .simulate(&lattice, &structure)
                    .map_err(|e| e.to_string())
            };
        Self {
            inner: SimulationObjective::new(reference, simulate, |simulated: &Curve, reference: &Curve| {
                cosine_similarity(simulated, reference)
            }),
        }
    }

    /// The measured pattern candidates are scored against.
    #[must_use]
    pub fn reference(&self) -> &Curve {
        self.inner.reference()
    }
}

impl Objective for XrdObjective {
    type Error = Error;

    fn evaluate(&self, params: &ParamSet) -> Result<f64> {
        self.inner.evaluate(params)
    }
}
