//! The bounded, continuous space the sampler searches.

use std::collections::BTreeMap;

use rand::Rng;

use crate::distribution::FloatDistribution;
use crate::error::{Error, Result};
use crate::types::ParamSet;

/// Inclusive `[low, high]` bounds for every parameter, keyed by name.
///
/// A `SearchSpace` is validated on construction: every bound is finite and
/// `low < high`, and at least one parameter is declared.
///
/// # Examples
///
/// ```
/// use latfit::SearchSpace;
///
/// let space = SearchSpace::builder()
///     .float("a", 18.0, 26.0)
///     .float("c", 3.0, 6.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(space.len(), 2);
/// assert!(SearchSpace::builder().float("x", 1.0, 0.0).build().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSpace {
    params: BTreeMap<String, FloatDistribution>,
}

impl SearchSpace {
    /// Creates a builder for a search space.
    #[must_use]
    pub fn builder() -> SearchSpaceBuilder {
        SearchSpaceBuilder::default()
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Always `false` for a validated space; provided for completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the bounds declared for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FloatDistribution> {
        self.params.get(name)
    }

    /// Iterates over `(name, bounds)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FloatDistribution)> {
        self.params.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Iterates over the parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Projects every value of `params` into its declared bounds.
    ///
    /// Values already inside their bounds are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] if a declared parameter has no
    /// value and [`Error::UnknownParameter`] if `params` names a parameter
    /// the space does not declare.
    pub fn clamp(&self, params: &ParamSet) -> Result<ParamSet> {
        if let Some(name) = params.keys().find(|k| !self.params.contains_key(*k)) {
            return Err(Error::UnknownParameter(name.clone()));
        }
        self.params
            .iter()
            .map(|(name, dist)| {
                let value = params
                    .get(name)
                    .ok_or_else(|| Error::MissingParameter(name.clone()))?;
                Ok((name.clone(), dist.clamp(*value)))
            })
            .collect()
    }

    /// Returns `true` if `params` has exactly the declared keys and every
    /// value lies within its bounds.
    #[must_use]
    pub fn contains(&self, params: &ParamSet) -> bool {
        params.len() == self.params.len()
            && self
                .params
                .iter()
                .all(|(name, dist)| params.get(name).is_some_and(|v| dist.contains(*v)))
    }

    /// Draws every parameter independently and uniformly from its bounds.
    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> ParamSet {
        self.params
            .iter()
            .map(|(name, dist)| (name.clone(), dist.sample(rng)))
            .collect()
    }
}

/// Builder for [`SearchSpace`].
///
/// Validation is deferred to [`build`](Self::build), which reports the first
/// invalid parameter. Declaring the same name twice keeps the last bounds.
#[derive(Clone, Debug, Default)]
pub struct SearchSpaceBuilder {
    params: Vec<(String, FloatDistribution)>,
}

impl SearchSpaceBuilder {
    /// Declares a continuous parameter with inclusive bounds.
    #[must_use]
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.param(name, FloatDistribution::new(low, high))
    }

    /// Declares a parameter from an existing distribution.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, distribution: FloatDistribution) -> Self {
        self.params.push((name.into(), distribution));
        self
    }

    /// Validates the declared bounds and builds the space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySearchSpace`] if nothing was declared, or the
    /// first [`Error::InvalidBounds`] / [`Error::NonFiniteBounds`] found.
    pub fn build(self) -> Result<SearchSpace> {
        if self.params.is_empty() {
            return Err(Error::EmptySearchSpace);
        }
        let mut params = BTreeMap::new();
        for (name, dist) in self.params {
            dist.validate(&name)?;
            params.insert(name, dist);
        }
        Ok(SearchSpace { params })
    }
}
