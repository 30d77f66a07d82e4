use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::distribution::FloatDistribution;
use crate::error::{Error, Result};
use crate::kde::GaussianKde;
use crate::sampler::Sampler;
use crate::sampler::tpe::gamma::{FixedGamma, GammaStrategy};
use crate::search_space::SearchSpace;
use crate::trial::Trial;
use crate::types::{Direction, ParamSet};

/// The good/bad split needs at least one trial on each side.
const MIN_MODEL_TRIALS: usize = 2;

/// Upper limit on the divisor of the minimum bandwidth (`width / 100`).
const MAX_BANDWIDTH_DIVISOR: f64 = 100.0;

/// A Tree-Parzen Estimator (TPE) sampler for Bayesian optimization.
///
/// TPE works by splitting completed trials into two groups based on their
/// objective values: good trials (the best gamma quantile under the study's
/// direction) and bad trials (the rest). For every parameter it fits a
/// kernel density estimator to each group, draws candidates from the good
/// density l(x), and keeps the candidate whose summed log-ratio
/// `log l(x) - log g(x)` across parameters is largest.
///
/// During the warmup phase (fewer than `n_startup_trials` completed trials),
/// TPE falls back to uniform sampling so the model never fits on too few
/// points.
///
/// # Examples
///
/// ```
/// use latfit::sampler::TpeSampler;
///
/// // Default settings: gamma 0.25, 10 warmup trials, 24 candidates
/// let sampler = TpeSampler::new();
///
/// let sampler = TpeSampler::builder()
///     .gamma(0.15)
///     .n_startup_trials(20)
///     .n_ei_candidates(32)
///     .seed(42)
///     .build()
///     .unwrap();
/// ```
pub struct TpeSampler {
    /// Size of the good group.
    gamma_strategy: Arc<dyn GammaStrategy>,
    /// Number of completed trials before TPE kicks in.
    n_startup_trials: usize,
    /// Number of candidate samples to score per proposal.
    n_ei_candidates: usize,
    /// Optional fixed bandwidth for KDE. If None, uses Scott's rule.
    kde_bandwidth: Option<f64>,
    /// Thread-safe RNG for sampling.
    rng: Mutex<StdRng>,
}

impl TpeSampler {
    /// Creates a new TPE sampler with default settings.
    ///
    /// Default settings:
    /// - gamma strategy: [`FixedGamma`] with gamma = 0.25
    /// - `n_startup_trials`: 10
    /// - `n_ei_candidates`: 24
    /// - `kde_bandwidth`: None (Scott's rule, clipped to the bounds)
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma_strategy: Arc::new(FixedGamma::default()),
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a builder for configuring a TPE sampler.
    #[must_use]
    pub fn builder() -> TpeSamplerBuilder {
        TpeSamplerBuilder::new()
    }

    /// Returns the gamma strategy used by this sampler.
    #[must_use]
    pub fn gamma_strategy(&self) -> &dyn GammaStrategy {
        self.gamma_strategy.as_ref()
    }

    /// Returns the number of warmup trials.
    #[must_use]
    pub fn n_startup_trials(&self) -> usize {
        self.n_startup_trials
    }

    /// Splits completed trials into good and bad groups.
    ///
    /// Trials are ordered best-first under `direction`; equal values keep
    /// their id order.
    fn split_trials<'a>(
        &self,
        completed: &[(&'a Trial, f64)],
        direction: Direction,
    ) -> (Vec<&'a Trial>, Vec<&'a Trial>) {
        let mut sorted: Vec<(&Trial, f64)> = completed.to_vec();
        sorted.sort_by(|a, b| direction.best_first(a.1, b.1));

        let n_good = self
            .gamma_strategy
            .n_good(sorted.len())
            .clamp(1, sorted.len() - 1);

        let good = sorted[..n_good].iter().map(|(t, _)| *t).collect();
        let bad = sorted[n_good..].iter().map(|(t, _)| *t).collect();
        (good, bad)
    }

    /// Picks the KDE bandwidth for one group of values.
    ///
    /// Scott's rule, clipped to `[width / min(100, n + 1), width]`. A group
    /// with a single point or no spread uses the full bound width.
    #[allow(clippy::cast_precision_loss)]
    fn bandwidth(&self, values: &[f64], dist: &FloatDistribution) -> f64 {
        if let Some(bw) = self.kde_bandwidth {
            return bw;
        }
        let width = dist.width();
        match GaussianKde::scott_bandwidth(values) {
            Some(h) => {
                let divisor = (values.len() as f64 + 1.0).min(MAX_BANDWIDTH_DIVISOR);
                h.clamp(width / divisor, width)
            }
            None => width,
        }
    }

    fn fit(
        &self,
        name: &str,
        dist: &FloatDistribution,
        good: &[&Trial],
        bad: &[&Trial],
    ) -> ParameterModel {
        let values = |group: &[&Trial]| -> Vec<f64> {
            group
                .iter()
                .filter_map(|t| t.params.get(name).copied())
                .filter(|v| v.is_finite())
                .collect()
        };
        let good_values = values(good);
        let bad_values = values(bad);

        let good_bw = self.bandwidth(&good_values, dist);
        let bad_bw = self.bandwidth(&bad_values, dist);
        match (
            GaussianKde::new(good_values, good_bw),
            GaussianKde::new(bad_values, bad_bw),
        ) {
            (Ok(good), Ok(bad)) => ParameterModel::Ratio {
                dist: *dist,
                good,
                bad,
            },
            // Trials from an older search space may lack this parameter.
            _ => ParameterModel::Uniform(*dist),
        }
    }
}

impl Default for TpeSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-parameter model used while scoring candidates.
enum ParameterModel {
    /// Good and bad densities over one parameter.
    Ratio {
        dist: FloatDistribution,
        good: GaussianKde,
        bad: GaussianKde,
    },
    /// Not enough data for this parameter; contributes a neutral score.
    Uniform(FloatDistribution),
}

impl ParameterModel {
    /// Draws one value and returns it with its log density ratio.
    fn draw(&self, rng: &mut StdRng) -> (f64, f64) {
        match self {
            Self::Ratio { dist, good, bad } => {
                let value = dist.clamp(good.draw(rng));
                (value, log_ratio(good.ln_density(value), bad.ln_density(value)))
            }
            Self::Uniform(dist) => (dist.sample(rng), 0.0),
        }
    }
}

/// `log l(x) - log g(x)`, with a vanishing bad density counted as
/// unbounded-favorable instead of dividing by zero.
fn log_ratio(log_l: f64, log_g: f64) -> f64 {
    let vanished = |x: f64| x.is_infinite() && x.is_sign_negative();
    if vanished(log_g) {
        if vanished(log_l) {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        log_l - log_g
    }
}

impl Sampler for TpeSampler {
    fn propose(&self, space: &SearchSpace, direction: Direction, history: &[Trial]) -> ParamSet {
        let mut rng = self.rng.lock();

        let completed: Vec<(&Trial, f64)> = history
            .iter()
            .filter_map(|t| t.completed_value().map(|v| (t, v)))
            .filter(|(_, v)| v.is_finite())
            .collect();

        if completed.len() < self.n_startup_trials.max(MIN_MODEL_TRIALS) {
            trace_debug!(
                n_completed = completed.len(),
                "warmup phase, sampling uniformly"
            );
            return space.sample_uniform(&mut *rng);
        }

        let (good, bad) = self.split_trials(&completed, direction);
        let models: Vec<(&str, ParameterModel)> = space
            .iter()
            .map(|(name, dist)| (name, self.fit(name, dist, &good, &bad)))
            .collect();

        let mut best: Option<(f64, ParamSet)> = None;
        for _ in 0..self.n_ei_candidates {
            let mut candidate = ParamSet::new();
            let mut score = 0.0;
            for (name, model) in &models {
                let (value, ratio) = model.draw(&mut *rng);
                candidate.insert((*name).to_string(), value);
                score += ratio;
            }
            // +inf and -inf across parameters: favor the unexplored side.
            if score.is_nan() {
                score = f64::INFINITY;
            }
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((_, candidate)) => candidate,
            None => space.sample_uniform(&mut *rng),
        }
    }
}

/// Builder for configuring a [`TpeSampler`].
///
/// # Examples
///
/// ```
/// use latfit::sampler::{SqrtGamma, TpeSamplerBuilder};
///
/// let sampler = TpeSamplerBuilder::new()
///     .gamma_strategy(SqrtGamma::default())
///     .n_startup_trials(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TpeSamplerBuilder {
    gamma_strategy: Arc<dyn GammaStrategy>,
    /// Raw gamma value for deferred validation (Some if `gamma()` was called)
    raw_gamma: Option<f64>,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    kde_bandwidth: Option<f64>,
    seed: Option<u64>,
}

impl TpeSamplerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma_strategy: Arc::new(FixedGamma::default()),
            raw_gamma: None,
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            seed: None,
        }
    }

    /// Sets a fixed gamma value for splitting trials into good/bad groups.
    ///
    /// A gamma of 0.25 means the best 25% of completed trials (under the
    /// study's direction) build the l(x) densities. Validated by `build()`.
    #[must_use]
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.raw_gamma = Some(gamma);
        self
    }

    /// Sets a custom gamma strategy. Overrides any earlier `gamma()` call.
    #[must_use]
    pub fn gamma_strategy<G: GammaStrategy + 'static>(mut self, strategy: G) -> Self {
        self.gamma_strategy = Arc::new(strategy);
        self.raw_gamma = None;
        self
    }

    /// Sets the number of completed trials sampled uniformly before the
    /// density model is used.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Sets the number of candidates drawn from l(x) per proposal.
    #[must_use]
    pub fn n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Sets a fixed bandwidth for the kernel density estimators.
    #[must_use]
    pub fn kde_bandwidth(mut self, bandwidth: f64) -> Self {
        self.kde_bandwidth = Some(bandwidth);
        self
    }

    /// Sets a seed for reproducible sampling.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the configured [`TpeSampler`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGamma` if a fixed gamma value was set and is not in (0.0, 1.0).
    /// Returns `Error::InvalidBandwidth` if `kde_bandwidth` is set but not positive.
    /// Returns `Error::InvalidCandidateCount` if `n_ei_candidates` is zero.
    pub fn build(self) -> Result<TpeSampler> {
        let gamma_strategy: Arc<dyn GammaStrategy> = match self.raw_gamma {
            Some(raw) => Arc::new(FixedGamma::new(raw)?),
            None => self.gamma_strategy,
        };

        if let Some(bw) = self.kde_bandwidth
            && !(bw > 0.0 && bw.is_finite())
        {
            return Err(Error::InvalidBandwidth(bw));
        }
        if self.n_ei_candidates == 0 {
            return Err(Error::InvalidCandidateCount);
        }

        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Ok(TpeSampler {
            gamma_strategy,
            n_startup_trials: self.n_startup_trials,
            n_ei_candidates: self.n_ei_candidates,
            kde_bandwidth: self.kde_bandwidth,
            rng: Mutex::new(rng),
        })
    }
}

impl Default for TpeSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
