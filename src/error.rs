use std::path::PathBuf;

use crate::types::{Direction, ParamSet, TrialState};

/// Errors returned by the optimizer, its storage backends and the
/// crystal-fitting helpers.
///
/// Use [`Error::kind`] to tell fatal configuration or storage problems apart
/// from per-trial evaluation failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is not strictly less than the upper bound.
    #[error("invalid bounds for '{name}': low ({low}) must be less than high ({high})")]
    InvalidBounds {
        /// The parameter name.
        name: String,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when a bound is NaN or infinite.
    #[error("invalid bounds for '{name}': bounds must be finite")]
    NonFiniteBounds {
        /// The parameter name.
        name: String,
    },

    /// Returned when a search space declares no parameters.
    #[error("search space must declare at least one parameter")]
    EmptySearchSpace,

    /// Returned when a study is opened without a search space.
    #[error("study '{0}' has no search space configured")]
    MissingSearchSpace(String),

    /// Returned when a parameter set lacks a parameter of the search space.
    #[error("missing value for parameter '{0}'")]
    MissingParameter(String),

    /// Returned when a parameter set contains a name the search space does not declare.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Returned when a stored study is reopened with a different direction.
    #[error("study '{study}' was created to {stored:?} but was reopened to {requested:?}")]
    DirectionMismatch {
        /// The study name.
        study: String,
        /// The direction recorded in storage.
        stored: Direction,
        /// The direction requested by the caller.
        requested: Direction,
    },

    /// Returned when a storage location string cannot be interpreted.
    #[error("invalid storage location '{0}'")]
    InvalidStorageLocation(String),

    /// Returned when gamma is not in the valid range (0.0, 1.0).
    #[error("invalid gamma: {0} must be in (0.0, 1.0)")]
    InvalidGamma(f64),

    /// Returned when bandwidth is not positive.
    #[error("invalid bandwidth: {0} must be positive")]
    InvalidBandwidth(f64),

    /// Returned when the sampler is configured to draw zero candidates.
    #[error("candidate count must be at least 1")]
    InvalidCandidateCount,

    /// Returned when KDE is created with empty samples.
    #[error("KDE requires at least one sample")]
    EmptySamples,

    /// Returned when the objective failed or produced a non-finite value.
    #[error("evaluation failed for {params:?}: {message}")]
    Evaluation {
        /// The parameters that were being evaluated.
        params: ParamSet,
        /// The underlying cause.
        message: String,
    },

    /// Returned when a storage operation fails.
    #[error("storage error: {0}")]
    Storage(String),

    /// Returned when a trial id does not exist in the study.
    #[error("trial {id} does not exist")]
    TrialNotFound {
        /// The requested trial id.
        id: u64,
    },

    /// Returned when finishing a trial that already reached a terminal state.
    #[error("trial {id} is {state:?}, expected Running")]
    TrialNotRunning {
        /// The trial id.
        id: u64,
        /// The state the trial is actually in.
        state: TrialState,
    },

    /// Returned when beginning a trial while another one is still running.
    #[error("trial {id} is still running")]
    TrialAlreadyRunning {
        /// The id of the running trial.
        id: u64,
    },

    /// Returned when the attempt cap is reached before enough trials completed.
    #[error(
        "gave up after {attempts} attempts: {completed} of {requested} trials completed"
    )]
    ExhaustedAttempts {
        /// Number of trials started during the run.
        attempts: usize,
        /// Number of those that completed.
        completed: usize,
        /// Number of completions requested.
        requested: usize,
    },

    /// Returned when requesting the best trial but no trials have completed.
    #[error("no completed trials available")]
    NoCompletedTrials,

    /// Returned when an input file cannot be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when an input file is malformed.
    #[error("{path}:{line}: {reason}")]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// Returned when two curves of different lengths are compared.
    #[error("curve length mismatch: {left} vs {right}")]
    CurveLengthMismatch {
        /// Length of the first curve.
        left: usize,
        /// Length of the second curve.
        right: usize,
    },

    /// Returned when a curve with zero norm is compared.
    #[error("curve has zero norm")]
    ZeroNormCurve,

    /// Returned when lattice constants do not describe a valid cell.
    #[error("degenerate lattice: {0}")]
    DegenerateLattice(String),
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad bounds, bad sampler settings, mismatched resumed direction.
    /// Fatal, no retry.
    Configuration,
    /// The objective failed for one parameter set. Recovered by the run loop.
    Evaluation,
    /// Persistence failure or inconsistent trial state. Fatal for the run.
    Storage,
    /// The objective failed too often to make progress. Fatal.
    ExhaustedAttempts,
    /// No completed trial exists yet.
    NoCompletedTrials,
    /// Malformed or unreadable input data for the crystal helpers.
    Input,
}

impl Error {
    /// Returns the category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBounds { .. }
            | Self::NonFiniteBounds { .. }
            | Self::EmptySearchSpace
            | Self::MissingSearchSpace(_)
            | Self::MissingParameter(_)
            | Self::UnknownParameter(_)
            | Self::DirectionMismatch { .. }
            | Self::InvalidStorageLocation(_)
            | Self::InvalidGamma(_)
            | Self::InvalidBandwidth(_)
            | Self::InvalidCandidateCount => ErrorKind::Configuration,
            Self::Evaluation { .. } => ErrorKind::Evaluation,
            Self::Storage(_)
            | Self::TrialNotFound { .. }
            | Self::TrialNotRunning { .. }
            | Self::TrialAlreadyRunning { .. } => ErrorKind::Storage,
            Self::ExhaustedAttempts { .. } => ErrorKind::ExhaustedAttempts,
            Self::NoCompletedTrials => ErrorKind::NoCompletedTrials,
            Self::EmptySamples
            | Self::Io { .. }
            | Self::Parse { .. }
            | Self::CurveLengthMismatch { .. }
            | Self::ZeroNormCurve
            | Self::DegenerateLattice(_) => ErrorKind::Input,
        }
    }

    /// Returns `true` if this error should abort the current run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Evaluation
    }

    pub(crate) fn storage(e: impl ToString) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result alias for fallible operations in this crate.
pub type Result<T> = core::result::Result<T, Error>;
