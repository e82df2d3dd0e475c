//! Two-stage inverse-transform sampler for a discrete joint distribution.
//!
//! A draw takes two uniforms from the caller's [`UniformSource`]:
//!
//! 1. `u` picks the row `i` from the cumulative X marginal.
//! 2. `v` picks the column `j` from the cumulative distribution of
//!    `P(Y = y_j | X = x_i) = p[i, j] / XDensity[i]`.
//!
//! Every cumulative table is built once in [`DiscreteJointSampler::new`]
//! and looked up with a half-open scan (see [`CumulativeTable::index_of`]),
//! so a draw costs O(R + C).

use tracing::debug;

use crate::error::{Result, SimulationError};
use crate::matrix::ProbabilityMatrix;
use crate::random::{CumulativeTable, UniformSource};
use crate::sample::Sample;

/// Draws `(x, y)` pairs distributed according to a joint PMF.
///
/// # Examples
/// ```
/// use jointsim::matrix::ProbabilityMatrix;
/// use jointsim::random::create_rng;
/// use jointsim::sampler::DiscreteJointSampler;
///
/// let pmf = ProbabilityMatrix::new(vec![
///     vec![0.1, 0.2],
///     vec![0.3, 0.4],
/// ]).unwrap();
/// let sampler = DiscreteJointSampler::new(pmf, vec![1, 2], vec![10, 20]).unwrap();
/// let sample = sampler.generate(&mut create_rng(7), 500).unwrap();
/// assert_eq!(sample.volume(), 500);
/// assert!(sample.pairs().iter().all(|&(x, y)| [1, 2].contains(&x) && [10, 20].contains(&y)));
/// ```
#[derive(Debug, Clone)]
pub struct DiscreteJointSampler {
    matrix: ProbabilityMatrix,
    x_support: Vec<i64>,
    y_support: Vec<i64>,
    rows: CumulativeTable,
    conditional: Vec<CumulativeTable>,
}

impl DiscreteJointSampler {
    /// Precomputes the marginal and conditional cumulative tables.
    ///
    /// The PMF should already have passed
    /// [`ProbabilityMatrixValidator`](crate::validate::ProbabilityMatrixValidator);
    /// the sampler itself only rejects supports of the wrong length.
    ///
    /// # Errors
    /// `InvalidArgument` if `x_support.len()` differs from the number of
    /// rows or `y_support.len()` from the number of columns.
    pub fn new(matrix: ProbabilityMatrix, x_support: Vec<i64>, y_support: Vec<i64>) -> Result<Self> {
        if x_support.len() != matrix.rows() {
            return Err(SimulationError::invalid(
                "x_support",
                format!("{} values for {} rows", x_support.len(), matrix.rows()),
            ));
        }
        if y_support.len() != matrix.columns() {
            return Err(SimulationError::invalid(
                "y_support",
                format!("{} values for {} columns", y_support.len(), matrix.columns()),
            ));
        }

        let rows = CumulativeTable::new(matrix.x_density());
        // Normalizing each row by its own total is the same as dividing by
        // XDensity[i]; an all-zero row stays all zero and is never scanned.
        let conditional = matrix.iter_rows().map(CumulativeTable::new).collect();

        debug!(
            rows = matrix.rows(),
            columns = matrix.columns(),
            x_total = rows.total_weight(),
            "built joint sampler"
        );

        Ok(Self {
            matrix,
            x_support,
            y_support,
            rows,
            conditional,
        })
    }

    /// The PMF being sampled.
    pub fn matrix(&self) -> &ProbabilityMatrix {
        &self.matrix
    }

    /// X support values, one per row.
    pub fn x_support(&self) -> &[i64] {
        &self.x_support
    }

    /// Y support values, one per column.
    pub fn y_support(&self) -> &[i64] {
        &self.y_support
    }

    /// Cumulative X marginal used for the first stage.
    pub fn row_cdf(&self) -> &[f64] {
        self.rows.values()
    }

    /// Cumulative conditional distribution of Y given row `i`.
    ///
    /// # Panics
    /// If `i` is not a row index.
    pub fn conditional_cdf(&self, i: usize) -> &[f64] {
        self.conditional[i].values()
    }

    /// Draws one `(row, column)` index pair, consuming `u` then `v`.
    ///
    /// # Errors
    /// `InvariantViolation` if a variate falls outside every cumulative
    /// interval, which means the PMF is all zero or holds NaN.
    pub fn sample_indices<U: UniformSource + ?Sized>(&self, source: &mut U) -> Result<(usize, usize)> {
        let u = source.next_uniform();
        let i = self.rows.index_of(u).ok_or_else(|| {
            SimulationError::invariant(format!("no X index for u = {u}"))
        })?;
        let v = source.next_uniform();
        let j = self.conditional[i].index_of(v).ok_or_else(|| {
            SimulationError::invariant(format!("no Y index for v = {v} in row {i}"))
        })?;
        Ok((i, j))
    }

    /// Draws one `(x, y)` pair.
    ///
    /// # Errors
    /// See [`sample_indices`](Self::sample_indices).
    pub fn sample<U: UniformSource + ?Sized>(&self, source: &mut U) -> Result<(i64, i64)> {
        let (i, j) = self.sample_indices(source)?;
        Ok((self.x_support[i], self.y_support[j]))
    }

    /// Draws `volume` independent pairs.
    ///
    /// # Errors
    /// `InvalidArgument` if `volume` is 0; otherwise the first failing draw.
    pub fn generate<U: UniformSource + ?Sized>(&self, source: &mut U, volume: usize) -> Result<JointSample> {
        if volume == 0 {
            return Err(SimulationError::invalid("volume", "must be positive"));
        }
        let pairs = (0..volume)
            .map(|_| self.sample(&mut *source))
            .collect::<Result<Vec<_>>>()?;
        debug!(volume, "generated joint sample");
        Ok(JointSample {
            pairs,
            x_support: self.x_support.clone(),
            y_support: self.y_support.clone(),
        })
    }
}

/// Pairs drawn by a [`DiscreteJointSampler`], with the supports they were
/// drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSample {
    pairs: Vec<(i64, i64)>,
    x_support: Vec<i64>,
    y_support: Vec<i64>,
}

impl JointSample {
    /// Drawn pairs in draw order.
    pub fn pairs(&self) -> &[(i64, i64)] {
        &self.pairs
    }

    /// Number of pairs.
    pub fn volume(&self) -> usize {
        self.pairs.len()
    }

    /// X support of the sampler.
    pub fn x_support(&self) -> &[i64] {
        &self.x_support
    }

    /// Y support of the sampler.
    pub fn y_support(&self) -> &[i64] {
        &self.y_support
    }

    /// The X projection as a [`Sample`].
    pub fn x_sample(&self) -> Result<Sample> {
        Sample::from_integers(self.pairs.iter().map(|&(x, _)| x))
    }

    /// The Y projection as a [`Sample`].
    pub fn y_sample(&self) -> Result<Sample> {
        Sample::from_integers(self.pairs.iter().map(|&(_, y)| y))
    }

    /// Relative frequency of every `(X[i], Y[j])` cell.
    pub fn empirical_matrix(&self) -> Result<ProbabilityMatrix> {
        ProbabilityMatrix::from_pairs(&self.pairs, &self.x_support, &self.y_support)
    }
}
