//! Joint probability mass function table.
//!
//! [`ProbabilityMatrix`] stores `P(X = x_i, Y = y_j)` row-major: row `i`
//! belongs to the i-th X support value, column `j` to the j-th Y support
//! value. The marginals are derived once at construction and the table is
//! never mutated afterwards.
//!
//! The matrix does not check that its entries sum to one. Run
//! [`ProbabilityMatrixValidator`](crate::validate::ProbabilityMatrixValidator)
//! first; an unnormalized table silently mis-scales everything computed from
//! it.

use std::fmt;
use std::ops::Index;

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::stats::kahan_sum_iter;

/// Rectangular joint PMF with cached row and column marginals.
///
/// # Examples
/// ```
/// use jointsim::matrix::ProbabilityMatrix;
/// let m = ProbabilityMatrix::new(vec![
///     vec![0.1, 0.4, 0.1],
///     vec![0.1, 0.1, 0.2],
/// ]).unwrap();
/// assert_eq!(m.total_count(), 6);
/// assert!((m.x_density()[0] - 0.6).abs() < 1e-12);
/// assert!((m.y_density()[2] - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityMatrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
    x_density: Vec<f64>,
    y_density: Vec<f64>,
}

impl ProbabilityMatrix {
    /// Builds a matrix from a table of rows.
    ///
    /// # Errors
    /// `InvalidArgument` if the table has no rows, a row has no columns, or
    /// the rows differ in length.
    pub fn new(table: Vec<Vec<f64>>) -> Result<Self> {
        let rows = table.len();
        let columns = table.first().map_or(0, Vec::len);
        if let Some((i, row)) = table.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(SimulationError::invalid(
                "probabilities",
                format!("row {i} has {} entries, expected {columns}", row.len()),
            ));
        }
        let data = table.into_iter().flatten().collect();
        Self::from_flat(rows, columns, data)
    }

    /// Builds a matrix from a row-major buffer of `rows × columns` entries.
    ///
    /// # Errors
    /// `InvalidArgument` if either dimension is zero, the buffer length
    /// does not match, or an entry is NaN or outside `[0, 1]`.
    pub fn from_flat(rows: usize, columns: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(SimulationError::invalid(
                "probabilities",
                format!("table is empty ({rows}x{columns})"),
            ));
        }
        if data.len() != rows * columns {
            return Err(SimulationError::invalid(
                "probabilities",
                format!(
                    "buffer holds {} entries, expected {rows}x{columns}",
                    data.len()
                ),
            ));
        }
        if let Some((k, p)) = data
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(SimulationError::invalid(
                "probabilities",
                format!(
                    "entry ({}, {}) = {p} should be from 0 to 1 (inclusive)",
                    k / columns,
                    k % columns
                ),
            ));
        }

        let x_density = (0..rows)
            .map(|i| kahan_sum_iter(data[i * columns..(i + 1) * columns].iter().copied()))
            .collect();
        let y_density = (0..columns)
            .map(|j| kahan_sum_iter((0..rows).map(|i| data[i * columns + j])))
            .collect();

        Ok(Self {
            rows,
            columns,
            data,
            x_density,
            y_density,
        })
    }

    /// Builds the empirical PMF of a set of drawn pairs.
    ///
    /// Entry `(i, j)` is the fraction of pairs equal to
    /// `(x_support[i], y_support[j])`.
    ///
    /// # Errors
    /// `InvalidArgument` if `pairs` is empty, a support is empty, or a pair
    /// holds a value missing from its support.
    pub fn from_pairs(pairs: &[(i64, i64)], x_support: &[i64], y_support: &[i64]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(SimulationError::invalid("pairs", "no pairs to count"));
        }
        if x_support.is_empty() || y_support.is_empty() {
            return Err(SimulationError::invalid("support", "support vector is empty"));
        }

        let columns = y_support.len();
        let mut counts = vec![0_u64; x_support.len() * columns];
        for &(x, y) in pairs {
            let i = position(x_support, x).ok_or_else(|| {
                SimulationError::invalid("pairs", format!("x = {x} is not in the X support"))
            })?;
            let j = position(y_support, y).ok_or_else(|| {
                SimulationError::invalid("pairs", format!("y = {y} is not in the Y support"))
            })?;
            counts[i * columns + j] += 1;
        }

        let volume = pairs.len() as f64;
        let data = counts.into_iter().map(|c| c as f64 / volume).collect();
        Self::from_flat(x_support.len(), columns, data)
    }

    /// Number of rows (size of the X support).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (size of the Y support).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of cells, `rows × columns`.
    pub fn total_count(&self) -> usize {
        self.x_density.len() * self.y_density.len()
    }

    /// Row sums: `P(X = x_i)`.
    pub fn x_density(&self) -> &[f64] {
        &self.x_density
    }

    /// Column sums: `P(Y = y_j)`.
    pub fn y_density(&self) -> &[f64] {
        &self.y_density
    }

    /// Entry `(i, j)`, or `None` when out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows && j < self.columns {
            Some(self.data[i * self.columns + j])
        } else {
            None
        }
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    /// If `i >= rows()`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.columns..(i + 1) * self.columns]
    }

    /// Iterates the rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.columns)
    }

    /// All entries in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copies the entries back out as a table of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// Compensated sum of every entry.
    pub fn total(&self) -> f64 {
        kahan_sum_iter(self.data.iter().copied())
    }
}

fn position(support: &[i64], value: i64) -> Option<usize> {
    support.iter().position(|&s| s == value)
}

impl Index<(usize, usize)> for ProbabilityMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(
            i < self.rows && j < self.columns,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.columns
        );
        &self.data[i * self.columns + j]
    }
}

impl fmt::Display for ProbabilityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            let line = row
                .iter()
                .map(|p| format!("{p:>6}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
