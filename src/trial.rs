//! Trial records and their lifecycle.

use core::fmt;

use crate::error::{Error, Result};
use crate::types::{ParamSet, TrialState};

/// A trial represents a single evaluation attempt within a study.
///
/// Trials are created `Running` with their parameters fixed and move exactly
/// once to [`Complete`](TrialState::Complete) (with a `value`) or
/// [`Failed`](TrialState::Failed) (with an `error`). The `Study` owns every
/// trial; callers receive clones.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trial {
    /// Sequence number, unique within the study and never reused.
    pub id: u64,
    /// The parameter values used for this trial.
    pub params: ParamSet,
    /// Lifecycle state.
    pub state: TrialState,
    /// Objective value, present only when `state` is `Complete`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
    /// Failure description, present only when `state` is `Failed`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub error: Option<String>,
}

impl Trial {
    /// Creates a new running trial.
    #[must_use]
    pub fn new(id: u64, params: ParamSet) -> Self {
        Self {
            id,
            params,
            state: TrialState::Running,
            value: None,
            error: None,
        }
    }

    /// Returns `true` once the trial reached `Complete` or `Failed`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state != TrialState::Running
    }

    /// Returns the value if the trial completed.
    #[must_use]
    pub fn completed_value(&self) -> Option<f64> {
        match self.state {
            TrialState::Complete => self.value,
            _ => None,
        }
    }

    /// Moves the trial to `Complete`.
    pub(crate) fn complete(&mut self, value: f64) -> Result<()> {
        self.ensure_running()?;
        self.state = TrialState::Complete;
        self.value = Some(value);
        Ok(())
    }

    /// Moves the trial to `Failed`.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_running()?;
        self.state = TrialState::Failed;
        self.error = Some(reason.into());
        Ok(())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.state == TrialState::Running {
            Ok(())
        } else {
            Err(Error::TrialNotRunning {
                id: self.id,
                state: self.state,
            })
        }
    }
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trial #{} [{}]", self.id, self.state.as_str())?;
        match (self.value, &self.error) {
            (Some(value), _) => write!(f, " value={value}")?,
            (None, Some(error)) => write!(f, " error={error}")?,
            (None, None) => {}
        }
        for (name, value) in &self.params {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// A trial handed out by [`Study::ask`](crate::Study::ask) that still awaits
/// its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTrial {
    /// The trial id to report back with [`Study::tell`](crate::Study::tell).
    pub id: u64,
    /// The parameters to evaluate.
    pub params: ParamSet,
}
