//! Kernel density estimation over one parameter.
//!
//! The TPE sampler fits one estimator to the values of the good trials and
//! one to the bad trials, then ranks candidates by the log ratio of the two
//! densities.

mod univariate;

pub(crate) use univariate::GaussianKde;
