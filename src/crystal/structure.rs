//! Atom labels and fractional positions read from a CIF file.

use std::path::Path;

use crate::error::{Error, Result};

/// Header of the last column of the CIF atom-site loop.
const ATOM_SITE_HEADER: &str = "_atom_site_occupancy";

/// The atoms of a unit cell: one label and one fractional position each.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    /// Atom labels (element or site names), in file order.
    pub labels: Vec<String>,
    /// Fractional `[x, y, z]` coordinates, parallel to `labels`.
    pub positions: Vec<[f64; 3]>,
}

impl Structure {
    /// Number of atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the structure has no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Parses the atom-site loop out of CIF text.
    ///
    /// Rows start after the `_atom_site_occupancy` header line and run until
    /// the next `loop_`, data block or tag. In each row the second column is
    /// the label and columns three to five are `x y z`; standard
    /// uncertainties such as `0.1234(5)` are accepted.
    ///
    /// `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the loop is missing, empty, or has a row
    /// with too few or non-numeric columns.
    pub fn from_cif_str(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |line: usize, reason: String| Error::Parse {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut lines = text.lines().enumerate();
        let header = lines
            .by_ref()
            .find(|(_, line)| line.trim() == ATOM_SITE_HEADER)
            .map(|(i, _)| i + 1)
            .ok_or_else(|| parse_error(0, format!("no '{ATOM_SITE_HEADER}' loop")))?;

        let mut labels = Vec::new();
        let mut positions = Vec::new();
        for (i, line) in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "loop_" || line.starts_with('_') || line.starts_with("data_") {
                break;
            }
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 5 {
                return Err(parse_error(
                    i + 1,
                    format!("expected at least 5 columns, found {}", columns.len()),
                ));
            }
            let mut position = [0.0; 3];
            for (slot, raw) in position.iter_mut().zip(&columns[2..5]) {
                *slot = parse_cif_number(raw)
                    .ok_or_else(|| parse_error(i + 1, format!("invalid coordinate '{raw}'")))?;
            }
            labels.push(columns[1].to_string());
            positions.push(position);
        }

        if labels.is_empty() {
            return Err(parse_error(header, "atom-site loop has no rows".to_string()));
        }
        Ok(Self { labels, positions })
    }
}

/// Parses a CIF number, dropping a trailing standard uncertainty.
fn parse_cif_number(raw: &str) -> Option<f64> {
    let value = raw.split_once('(').map_or(raw, |(value, _)| value);
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a CIF file and returns its atoms.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or [`Error::Parse`]
/// as described in [`Structure::from_cif_str`].
pub fn load_structure(path: impl AsRef<Path>) -> Result<Structure> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Structure::from_cif_str(&text, path)
}
