//! Core types for the optimizer library.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A concrete parameter assignment, keyed by parameter name.
///
/// A `BTreeMap` keeps iteration order stable, which the sampler relies on
/// for reproducible proposals under a fixed seed.
pub type ParamSet = BTreeMap<String, f64>;

/// The direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }

    /// Orders two values so that the better one compares as `Less`.
    pub(crate) fn best_first(self, a: f64, b: f64) -> core::cmp::Ordering {
        let ordering = a.partial_cmp(&b).unwrap_or(core::cmp::Ordering::Equal);
        match self {
            Self::Minimize => ordering,
            Self::Maximize => ordering.reverse(),
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Minimize => "minimize",
            Self::Maximize => "maximize",
        }
    }
}

/// The state of a trial in its lifecycle.
///
/// Trials are created `Running` and move exactly once to `Complete` or `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrialState {
    /// The trial is currently running.
    Running,
    /// The trial completed successfully.
    Complete,
    /// The trial failed with an error.
    Failed,
}

impl TrialState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}
