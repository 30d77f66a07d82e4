#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Resumable black-box optimization for fitting crystal-lattice parameters
//! against an observed measurement. A named [`Study`] records every trial in
//! a durable store, a density-ratio [`TpeSampler`](sampler::TpeSampler)
//! proposes new parameter sets from the accumulated history, and the run loop
//! keeps bookkeeping correct when the objective fails or the process dies
//! mid-evaluation.
//!
//! # Getting Started
//!
//! ```
//! use latfit::prelude::*;
//!
//! let space = SearchSpace::builder().float("a", 0.0, 1.0).build().unwrap();
//! let study = Study::builder()
//!     .name("quickstart")
//!     .maximize()
//!     .search_space(space)
//!     .sampler(TpeSampler::builder().seed(7).build().unwrap())
//!     .open()
//!     .unwrap();
//!
//! study
//!     .optimize(30, |params: &ParamSet| {
//!         let a = params["a"];
//!         Ok::<_, Error>(-(a - 0.7).powi(2))
//!     })
//!     .unwrap();
//!
//! let best = study.best_trial().unwrap();
//! println!("a = {:.4}, f(a) = {:.4}", best.params["a"], best.value.unwrap());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`] | Inclusive `[low, high]` bounds per parameter name. |
//! | [`Trial`] | One evaluation attempt: parameters, lifecycle state, value or error. |
//! | [`Study`] | A named, durable trial log plus the ask/evaluate/record loop. |
//! | [`Storage`](storage::Storage) | Where trials are persisted: memory, JSONL journal or `SQLite`. |
//! | [`Sampler`](sampler::Sampler) | Strategy proposing the next parameter set from history. |
//! | [`Objective`] | The function being optimized. |
//!
//! # Resuming
//!
//! Opening a study with the same name against the same storage location
//! continues where the previous process stopped. Trials that were still
//! running when the previous process died are recorded as failed
//! (`"interrupted"`) and never re-evaluated.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public data types | via `journal`/`sqlite` |
//! | `journal` | [`JournalStorage`](storage::JournalStorage) — JSONL log with file locking | on |
//! | `sqlite` | [`SqliteStorage`](storage::SqliteStorage) — `SQLite` database | on |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key optimization points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod crystal;
mod distribution;
mod error;
mod kde;
pub mod objective;
mod rng_util;
mod run;
pub mod sampler;
mod search_space;
pub mod storage;
mod study;
mod trial;
mod types;

pub use distribution::FloatDistribution;
pub use error::{Error, ErrorKind, Result};
pub use objective::{Objective, SimulationObjective};
pub use run::run;
pub use search_space::{SearchSpace, SearchSpaceBuilder};
pub use study::{StopHandle, Study, StudyBuilder};
pub use trial::{PendingTrial, Trial};
pub use types::{Direction, ParamSet, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use latfit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::distribution::FloatDistribution;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::objective::{Objective, SimulationObjective};
    pub use crate::run::run;
    pub use crate::sampler::{FixedGamma, RandomSampler, Sampler, SqrtGamma, TpeSampler};
    pub use crate::search_space::{SearchSpace, SearchSpaceBuilder};
    #[cfg(feature = "journal")]
    pub use crate::storage::JournalStorage;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteStorage;
    pub use crate::storage::{MemoryStorage, Storage};
    pub use crate::study::{StopHandle, Study, StudyBuilder};
    pub use crate::trial::{PendingTrial, Trial};
    pub use crate::types::{Direction, ParamSet, TrialState};
}
