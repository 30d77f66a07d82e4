#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod random;
mod tpe;

use latfit::{ParamSet, SearchSpace, Trial, TrialState};

/// A completed trial for building sampler histories by hand.
pub(crate) fn completed(id: u64, params: ParamSet, value: f64) -> Trial {
    Trial {
        id,
        params,
        state: TrialState::Complete,
        value: Some(value),
        error: None,
    }
}

pub(crate) fn unit_space() -> SearchSpace {
    SearchSpace::builder()
        .float("a", 0.0, 1.0)
        .build()
        .unwrap()
}
