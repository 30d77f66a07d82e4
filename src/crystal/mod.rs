//! Fitting crystal-lattice constants against a measured powder pattern.
//!
//! This module holds the data boundary of the optimizer: reading a CIF
//! structure and a measured CSV pattern, the lattice search space, and an
//! [`Objective`](crate::Objective) that scores a candidate cell by the
//! cosine similarity of its simulated pattern to the measurement.
//!
//! The physical simulator is not part of this crate; plug one in through
//! [`ForwardModel`].
//!
//! ```no_run
//! use latfit::crystal::{Curve, ForwardModel, LatticeParameters, Structure, fit_lattice};
//!
//! struct External;
//!
//! impl ForwardModel for External {
//!     type Error = String;
//!
//!     fn simulate(&self, lattice: &LatticeParameters, structure: &Structure) -> Result<Curve, String> {
//!         unimplemented!("call the diffraction simulator")
//!     }
//! }
//!
//! let best = fit_lattice(
//!     "structure",
//!     "sqlite:///structure.db",
//!     100,
//!     "structure.cif",
//!     "target.csv",
//!     External,
//! )
//! .unwrap();
//! println!("Best Score\n{:?}", best.params);
//! ```

mod lattice;
mod objective;
mod signal;
mod structure;

use std::path::Path;

pub use lattice::{
    ANGLE_BOUNDS, AB_LENGTH_BOUNDS, CU_K_ALPHA, C_LENGTH_BOUNDS, LatticeParameters, TwoThetaGrid,
    bragg_two_theta, lattice_search_space,
};
pub use objective::{ForwardModel, XrdObjective};
pub use signal::{Curve, cosine_similarity, load_reference_signal, parse_reference_signal};
pub use structure::{Structure, load_structure};

use crate::error::Result;
use crate::trial::Trial;

/// Loads the structure and measured pattern, then runs (or resumes) the
/// maximizing study `study_name` over [`lattice_search_space`] for
/// `n_trials` more completed trials.
///
/// Returns the best trial of the whole study.
///
/// # Errors
///
/// Returns input errors for unreadable or malformed files, and every error
/// of [`run`](crate::run).
pub fn fit_lattice<M>(
    study_name: &str,
    storage_location: &str,
    n_trials: usize,
    structure_path: impl AsRef<Path>,
    reference_path: impl AsRef<Path>,
    model: M,
) -> Result<Trial>
where
    M: ForwardModel + 'static,
{
    let structure = load_structure(structure_path)?;
    let reference = load_reference_signal(reference_path)?;
    trace_info!(
        atoms = structure.len(),
        points = reference.len(),
        "loaded inputs"
    );
    let objective = XrdObjective::new(model, structure, reference);
    crate::run(
        study_name,
        storage_location,
        n_trials,
        lattice_search_space()?,
        objective,
    )
}
