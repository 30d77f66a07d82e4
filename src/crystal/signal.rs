//! Diffraction curves: loading the observed pattern and comparing curves.

use std::path::Path;

use crate::error::{Error, Result};

/// Intensity samples on a fixed 2θ grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    values: Vec<f64>,
}

impl Curve {
    /// Wraps intensity samples.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// The intensity samples.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the curve has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product with a curve of the same length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CurveLengthMismatch`] if the lengths differ.
    pub fn dot(&self, other: &Self) -> Result<f64> {
        if self.len() != other.len() {
            return Err(Error::CurveLengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum())
    }
}

impl From<Vec<f64>> for Curve {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Cosine of the angle between two curves: 1 for identical shape, 0 for
/// orthogonal, −1 for opposite.
///
/// # Errors
///
/// Returns [`Error::CurveLengthMismatch`] for curves of different length and
/// [`Error::ZeroNormCurve`] if either curve is all zeros.
///
/// # Examples
///
/// ```
/// use latfit::crystal::{Curve, cosine_similarity};
///
/// let a = Curve::new(vec![1.0, 2.0, 3.0]);
/// let b = Curve::new(vec![2.0, 4.0, 6.0]);
/// assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn cosine_similarity(a: &Curve, b: &Curve) -> Result<f64> {
    let dot = a.dot(b)?;
    let norms = a.norm() * b.norm();
    if norms <= 0.0 {
        return Err(Error::ZeroNormCurve);
    }
    Ok(dot / norms)
}

/// Parses a measured pattern from CSV text with a header row.
///
/// The columns whose trimmed names are `yobs` and `bkg` are read and the
/// curve is their per-row difference, the background-subtracted intensity.
/// `path` is only used in error messages.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a column is missing or a cell is not a
/// finite number.
pub fn parse_reference_signal(text: &str, path: &Path) -> Result<Curve> {
    let parse_error = |line: usize, reason: String| Error::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let (_, header) = lines
        .next()
        .ok_or_else(|| parse_error(1, "empty file".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| parse_error(1, format!("missing column '{name}'")))
    };
    let yobs = column("yobs")?;
    let bkg = column("bkg")?;

    let mut values = Vec::new();
    for (i, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |idx: usize| -> Result<f64> {
            let raw = cells
                .get(idx)
                .ok_or_else(|| parse_error(i + 1, format!("missing cell {}", idx + 1)))?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| parse_error(i + 1, format!("invalid number '{raw}'")))
        };
        values.push(cell(yobs)? - cell(bkg)?);
    }
    Ok(Curve::new(values))
}

/// Reads the observed pattern from a CSV file, see [`parse_reference_signal`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Parse`]
/// for malformed content.
pub fn load_reference_signal(path: impl AsRef<Path>) -> Result<Curve> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_reference_signal(&text, path)
}
