use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sampler::Sampler;
use crate::sampler::tpe::TpeSampler;
use crate::search_space::SearchSpace;
use crate::storage::{MemoryStorage, Storage};
use crate::types::Direction;

use super::Study;

/// A builder for opening [`Study`] instances with a fluent API.
///
/// Created via [`Study::builder()`]. Collects name, direction, search space,
/// sampler, storage and attempt cap, then loads or creates the study in
/// [`open`](Self::open).
///
/// # Defaults
///
/// - Name: `"default"`
/// - Direction: [`Minimize`](Direction::Minimize)
/// - Sampler: [`TpeSampler`]
/// - Storage: a fresh [`MemoryStorage`]
/// - Attempt cap: `max(10, 10 * n_trials)` per [`optimize`](Study::optimize) call
///
/// # Examples
///
/// ```
/// use latfit::prelude::*;
///
/// let space = SearchSpace::builder().float("c", 3.0, 6.0).build().unwrap();
/// let study = Study::builder()
///     .name("structure")
///     .maximize()
///     .search_space(space)
///     .sampler(RandomSampler::with_seed(3))
///     .storage(MemoryStorage::new())
///     .max_attempts(100)
///     .open()
///     .unwrap();
///
/// assert_eq!(study.name(), "structure");
/// ```
pub struct StudyBuilder {
    name: String,
    direction: Direction,
    space: Option<SearchSpace>,
    sampler: Option<Arc<dyn Sampler>>,
    storage: Option<Arc<dyn Storage>>,
    max_attempts: Option<usize>,
}

impl StudyBuilder {
    /// Create a new builder with default settings.
    pub(super) fn new() -> Self {
        Self {
            name: "default".to_string(),
            direction: Direction::Minimize,
            space: None,
            sampler: None,
            storage: None,
            max_attempts: None,
        }
    }

    /// Set the study name used to locate persisted state.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the optimization direction to minimize (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Set the optimization direction to maximize.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Set the optimization direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the search space. Required.
    #[must_use]
    pub fn search_space(mut self, space: SearchSpace) -> Self {
        self.space = Some(space);
        self
    }

    /// Set the sampler used for parameter proposals.
    #[must_use]
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Set a storage backend.
    #[must_use]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Set a storage backend that is shared with other studies.
    #[must_use]
    pub fn shared_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Cap the number of attempts (completed plus failed trials) a single
    /// [`optimize`](Study::optimize) call may spend.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Loads the study from storage, or creates it.
    ///
    /// Trials left `Running` by a previous process are recorded as failed
    /// with reason `"interrupted"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSearchSpace`] without a search space,
    /// [`Error::DirectionMismatch`] if the stored study has another
    /// direction, or a storage error.
    pub fn open(self) -> Result<Study> {
        let space = self
            .space
            .ok_or_else(|| Error::MissingSearchSpace(self.name.clone()))?;
        let sampler = self
            .sampler
            .unwrap_or_else(|| Arc::new(TpeSampler::new()));
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        Study::open_with(
            self.name,
            self.direction,
            space,
            sampler,
            storage,
            self.max_attempts,
        )
    }
}
