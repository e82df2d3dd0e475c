//! Point and interval estimates, correlation, and the chi-squared test.
//!
//! Everything here is a pure function of its arguments. The theoretical
//! side of a comparison passes the PMF marginals as `density`; the
//! empirical side passes the marginals of the counted pairs. The formulas
//! are the same.
//!
//! # Goodness of fit
//!
//! ```text
//! χ² = n · Σ_{i,j} (e_ij − t_ij)² / t_ij,   df = R·C − 1
//! ```
//!
//! The sample is consistent with the PMF when `χ² < χ²_{1−α}(df)`.

use serde::Serialize;

use crate::error::{ensure_probability, Result, SimulationError};
use crate::matrix::ProbabilityMatrix;
use crate::sample::Sample;
use crate::special::{chi_squared_quantile, t_distribution_quantile};
use crate::stats::kahan_sum_iter;

// ---------------------------------------------------------------------------
// Point estimates
// ---------------------------------------------------------------------------

fn ensure_same_length(density: &[f64], support: &[i64]) -> Result<()> {
    if density.len() != support.len() {
        return Err(SimulationError::invalid(
            "support",
            format!(
                "{} support values for {} probabilities",
                support.len(),
                density.len()
            ),
        ));
    }
    Ok(())
}

/// Expected value `Σ density[k] · support[k]`.
///
/// # Examples
/// ```
/// use jointsim::estimation::mean_estimation;
/// let m = mean_estimation(&[0.25, 0.5, 0.25], &[1, 2, 3]).unwrap();
/// assert!((m - 2.0).abs() < 1e-12);
/// ```
pub fn mean_estimation(density: &[f64], support: &[i64]) -> Result<f64> {
    ensure_same_length(density, support)?;
    Ok(kahan_sum_iter(
        density.iter().zip(support).map(|(&p, &x)| p * x as f64),
    ))
}

/// Variance `Σ density[k] · (support[k] − mean)²` around a given mean.
pub fn variance_estimation(density: &[f64], mean: f64, support: &[i64]) -> Result<f64> {
    ensure_same_length(density, support)?;
    Ok(kahan_sum_iter(density.iter().zip(support).map(|(&p, &x)| {
        let d = x as f64 - mean;
        p * d * d
    })))
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// Two-sided Student critical value `t_{(1 + significance)/2}(df)`.
///
/// `significance` is the confidence level of the interval (0.95 gives the
/// 97.5% quantile). A significance of 0 gives 0; a significance of 1 gives
/// infinity.
///
/// # Errors
/// `InvalidArgument` if `significance` is outside `[0, 1]` or `df` is 0.
///
/// # Examples
/// ```
/// use jointsim::estimation::student_quantile;
/// let t = student_quantile(0.95, 10).unwrap();
/// assert!((t - 2.228139).abs() < 1e-5);
/// ```
pub fn student_quantile(significance: f64, df: usize) -> Result<f64> {
    let significance = ensure_probability("significance", significance)?;
    if df == 0 {
        return Err(SimulationError::invalid(
            "degrees of freedom",
            "must be positive",
        ));
    }
    if significance == 0.0 {
        return Ok(0.0);
    }
    if significance == 1.0 {
        return Ok(f64::INFINITY);
    }
    Ok(t_distribution_quantile((1.0 + significance) / 2.0, df as f64))
}

/// Chi-squared critical value `χ²_{1−confidence}(df)`.
///
/// `confidence` is the test's significance level α: 0.05 gives the 95th
/// percentile. A confidence of 0 gives infinity.
///
/// # Errors
/// `InvalidArgument` if `confidence` is outside `[0, 1]` or `df` is 0.
///
/// # Examples
/// ```
/// use jointsim::estimation::chi_squared_critical;
/// let c = chi_squared_critical(0.05, 11).unwrap();
/// assert!((c - 19.675138).abs() < 1e-5);
/// ```
pub fn chi_squared_critical(confidence: f64, df: usize) -> Result<f64> {
    let confidence = ensure_probability("confidence", confidence)?;
    if df == 0 {
        return Err(SimulationError::invalid(
            "degrees of freedom",
            "must be positive",
        ));
    }
    if confidence == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(chi_squared_quantile(1.0 - confidence, df as f64))
}

// ---------------------------------------------------------------------------
// Interval estimate
// ---------------------------------------------------------------------------

/// Confidence interval for a sample mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Sample mean at the centre of the interval.
    pub mean: f64,
    /// `t · √(s² / n)`.
    pub half_width: f64,
    /// Confidence level the interval was built for.
    pub significance: f64,
}

impl ConfidenceInterval {
    /// `mean − half_width`.
    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    /// `mean + half_width`.
    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }

    /// Returns true if `value` lies in the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower() <= value && value <= self.upper()
    }
}

/// Interval estimate `mean ± t · √(s² / n)` of a sample mean, with `s²`
/// the unbiased variance and `t` the Student quantile at `n − 1` degrees
/// of freedom.
///
/// # Errors
/// `InvalidArgument` if `significance` is outside `[0, 1]` or the sample
/// holds fewer than two values.
pub fn interval_estimation(sample: &Sample, significance: f64) -> Result<ConfidenceInterval> {
    let significance = ensure_probability("significance", significance)?;
    let variance = sample.unbiased_variance().ok_or_else(|| {
        SimulationError::invalid("sample", "at least two values are needed for an interval")
    })?;
    let volume = sample.volume();
    let t = student_quantile(significance, volume - 1)?;
    Ok(ConfidenceInterval {
        mean: sample.mean(),
        half_width: t * (variance / volume as f64).sqrt(),
        significance,
    })
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Correlation coefficient of X and Y under the joint PMF `matrix`.
///
/// `E[XY]` is the bilinear form `xᵗ · P · y`. A degenerate axis (all mass
/// on one support value) has zero variance, and the coefficient is NaN.
///
/// # Errors
/// `InvalidArgument` if a support length differs from the matching matrix
/// dimension.
pub fn correlation(matrix: &ProbabilityMatrix, x: &[i64], y: &[i64]) -> Result<f64> {
    let mean_x = mean_estimation(matrix.x_density(), x)?;
    let mean_y = mean_estimation(matrix.y_density(), y)?;
    let var_x = variance_estimation(matrix.x_density(), mean_x, x)?;
    let var_y = variance_estimation(matrix.y_density(), mean_y, y)?;

    let mixed = kahan_sum_iter(matrix.iter_rows().zip(x).flat_map(|(row, &xi)| {
        row.iter()
            .zip(y)
            .map(move |(&p, &yj)| xi as f64 * p * yj as f64)
    }));

    let denominator = (var_x * var_y).sqrt();
    if !(denominator > 0.0) {
        return Ok(f64::NAN);
    }
    Ok((mixed - mean_x * mean_y) / denominator)
}

// ---------------------------------------------------------------------------
// Chi-squared test
// ---------------------------------------------------------------------------

/// Pearson statistic `n · Σ (e − t)² / t` between an empirical and a
/// theoretical PMF.
///
/// Cells with zero theoretical mass contribute nothing when the empirical
/// mass is zero too, and make the statistic infinite otherwise.
///
/// # Errors
/// `InvalidArgument` if the shapes differ or `volume` is 0.
pub fn chi_squared_statistic(
    empirical: &ProbabilityMatrix,
    theoretical: &ProbabilityMatrix,
    volume: usize,
) -> Result<f64> {
    if empirical.rows() != theoretical.rows() || empirical.columns() != theoretical.columns() {
        return Err(SimulationError::invalid(
            "empirical",
            format!(
                "shape {}x{} does not match theoretical {}x{}",
                empirical.rows(),
                empirical.columns(),
                theoretical.rows(),
                theoretical.columns()
            ),
        ));
    }
    if volume == 0 {
        return Err(SimulationError::invalid("volume", "must be positive"));
    }

    let mut terms = Vec::with_capacity(theoretical.total_count());
    for (&e, &t) in empirical.as_slice().iter().zip(theoretical.as_slice()) {
        if t == 0.0 {
            if e == 0.0 {
                continue;
            }
            return Ok(f64::INFINITY);
        }
        let d = e - t;
        terms.push(d * d / t);
    }
    Ok(volume as f64 * kahan_sum_iter(terms))
}

/// Outcome of a chi-squared goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoodnessOfFit {
    /// Pearson statistic.
    pub statistic: f64,
    /// `χ²_{1−α}(df)`.
    pub critical_value: f64,
    /// `R·C − 1`.
    pub degrees_of_freedom: usize,
    /// `statistic < critical_value`.
    pub consistent: bool,
}

/// Runs the chi-squared test of `empirical` (counted from `volume` pairs)
/// against `theoretical` at significance level `confidence`.
///
/// # Errors
/// `InvalidArgument` on shape mismatch, `volume == 0`, a `confidence`
/// outside `[0, 1]`, or a 1×1 table (no degrees of freedom).
pub fn goodness_of_fit(
    empirical: &ProbabilityMatrix,
    theoretical: &ProbabilityMatrix,
    volume: usize,
    confidence: f64,
) -> Result<GoodnessOfFit> {
    let statistic = chi_squared_statistic(empirical, theoretical, volume)?;
    let degrees_of_freedom = theoretical.total_count() - 1;
    let critical_value = chi_squared_critical(confidence, degrees_of_freedom)?;
    Ok(GoodnessOfFit {
        statistic,
        critical_value,
        degrees_of_freedom,
        consistent: statistic < critical_value,
    })
}
