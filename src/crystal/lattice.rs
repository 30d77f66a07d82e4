//! Unit-cell parameters, their search bounds and the 2θ sampling grid.

use crate::error::{Error, Result};
use crate::search_space::SearchSpace;
use crate::types::ParamSet;

/// Bounds for the `a` and `b` cell lengths, in Å.
pub const AB_LENGTH_BOUNDS: (f64, f64) = (18.0, 26.0);
/// Bounds for the `c` cell length, in Å.
pub const C_LENGTH_BOUNDS: (f64, f64) = (3.0, 6.0);
/// Bounds for the cell angles, in degrees.
pub const ANGLE_BOUNDS: (f64, f64) = (60.0, 120.0);
/// Cu Kα1 wavelength in Å.
pub const CU_K_ALPHA: f64 = 1.5406;

/// The six constants of a unit cell: lengths in Å, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeParameters {
    /// Length of the first cell edge.
    pub a: f64,
    /// Length of the second cell edge.
    pub b: f64,
    /// Length of the third cell edge.
    pub c: f64,
    /// Angle between `b` and `c`.
    pub alpha: f64,
    /// Angle between `a` and `c`.
    pub beta: f64,
    /// Angle between `a` and `b`.
    pub gamma: f64,
}

impl LatticeParameters {
    /// Reads the six constants from a parameter set keyed
    /// `a b c alpha beta gamma`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] for the first absent key.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let get = |name: &str| {
            params
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingParameter(name.to_string()))
        };
        Ok(Self {
            a: get("a")?,
            b: get("b")?,
            c: get("c")?,
            alpha: get("alpha")?,
            beta: get("beta")?,
            gamma: get("gamma")?,
        })
    }

    /// The constants as a parameter set.
    #[must_use]
    pub fn to_params(&self) -> ParamSet {
        [
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }

    /// Cell volume in Å³.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateLattice`] for non-positive lengths or an
    /// angle combination that does not close into a cell.
    pub fn volume(&self) -> Result<f64> {
        if [self.a, self.b, self.c]
            .iter()
            .any(|l| !(l.is_finite() && *l > 0.0))
        {
            return Err(Error::DegenerateLattice(format!(
                "cell lengths must be positive: a={} b={} c={}",
                self.a, self.b, self.c
            )));
        }
        let (ca, cb, cg) = self.cosines();
        let radicand = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if !(radicand.is_finite() && radicand > 0.0) {
            return Err(Error::DegenerateLattice(format!(
                "angles alpha={} beta={} gamma={} do not form a cell",
                self.alpha, self.beta, self.gamma
            )));
        }
        Ok(self.a * self.b * self.c * radicand.sqrt())
    }

    /// Interplanar spacing of the `(h k l)` planes, in Å.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateLattice`] if the cell is degenerate or
    /// `(h k l)` is `(0 0 0)`.
    pub fn d_spacing(&self, h: i32, k: i32, l: i32) -> Result<f64> {
        let volume = self.volume()?;
        let (ca, cb, cg) = self.cosines();
        let (a, b, c) = (self.a, self.b, self.c);

        // Metric tensor entries.
        let g11 = a * a;
        let g22 = b * b;
        let g33 = c * c;
        let g12 = a * b * cg;
        let g13 = a * c * cb;
        let g23 = b * c * ca;

        // Cofactors of the symmetric metric tensor; det(G) = V².
        let c11 = g22 * g33 - g23 * g23;
        let c22 = g11 * g33 - g13 * g13;
        let c33 = g11 * g22 - g12 * g12;
        let c12 = g13 * g23 - g12 * g33;
        let c13 = g12 * g23 - g13 * g22;
        let c23 = g12 * g13 - g11 * g23;

        let (h, k, l) = (f64::from(h), f64::from(k), f64::from(l));
        let inv_d2 = (h * h * c11
            + k * k * c22
            + l * l * c33
            + 2.0 * (h * k * c12 + h * l * c13 + k * l * c23))
            / (volume * volume);
        if inv_d2 > 0.0 {
            Ok(inv_d2.sqrt().recip())
        } else {
            Err(Error::DegenerateLattice(format!(
                "no spacing for reflection ({h} {k} {l})"
            )))
        }
    }

    fn cosines(&self) -> (f64, f64, f64) {
        (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        )
    }
}

/// Diffraction angle 2θ in degrees for spacing `d` (Bragg's law), or `None`
/// if the reflection is not reachable at `wavelength`.
#[must_use]
pub fn bragg_two_theta(d: f64, wavelength: f64) -> Option<f64> {
    let sin_theta = wavelength / (2.0 * d);
    (sin_theta.is_finite() && (0.0..=1.0).contains(&sin_theta))
        .then(|| 2.0 * sin_theta.asin().to_degrees())
}

/// The search space for the six lattice constants: `a` and `b` in 18–26 Å,
/// `c` in 3–6 Å, every angle in 60–120°.
///
/// # Errors
///
/// Never fails for the built-in bounds; the `Result` comes from
/// [`SearchSpaceBuilder::build`](crate::SearchSpaceBuilder::build).
pub fn lattice_search_space() -> Result<SearchSpace> {
    SearchSpace::builder()
        .float("a", AB_LENGTH_BOUNDS.0, AB_LENGTH_BOUNDS.1)
        .float("b", AB_LENGTH_BOUNDS.0, AB_LENGTH_BOUNDS.1)
        .float("c", C_LENGTH_BOUNDS.0, C_LENGTH_BOUNDS.1)
        .float("alpha", ANGLE_BOUNDS.0, ANGLE_BOUNDS.1)
        .float("beta", ANGLE_BOUNDS.0, ANGLE_BOUNDS.1)
        .float("gamma", ANGLE_BOUNDS.0, ANGLE_BOUNDS.1)
        .build()
}

/// Evenly spaced 2θ angles, in degrees, on which curves are sampled.
///
/// The default grid runs from 5° to 40° in 0.02° steps, 1751 points, both
/// ends included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoThetaGrid {
    start: f64,
    step: f64,
    len: usize,
}

impl TwoThetaGrid {
    /// Creates a grid from `start` to `stop` inclusive.
    ///
    /// `stop` is included when it lies on the grid up to rounding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteBounds`] for a non-finite argument and
    /// [`Error::InvalidBounds`] unless `start < stop` and `step > 0`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(Error::NonFiniteBounds {
                name: "two_theta".to_string(),
            });
        }
        if step <= 0.0 {
            return Err(Error::InvalidBounds {
                name: "two_theta step".to_string(),
                low: 0.0,
                high: step,
            });
        }
        if start >= stop {
            return Err(Error::InvalidBounds {
                name: "two_theta".to_string(),
                low: start,
                high: stop,
            });
        }
        let len = ((stop - start) / step + 1e-9).floor() as usize + 1;
        Ok(Self { start, step, len })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a grid has at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Angle of point `i`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn angle(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    /// Iterates over every angle in ascending order.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(|i| self.angle(i))
    }

    /// Grid spacing in degrees.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Default for TwoThetaGrid {
    fn default() -> Self {
        Self {
            start: 5.0,
            step: 0.02,
            len: 1751,
        }
    }
}
