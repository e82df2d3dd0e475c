//! End-to-end simulation run: validate, sample, compare.
//!
//! [`run_simulation`] draws `config.volume` pairs from a PMF and sets every
//! empirical statistic next to its theoretical counterpart. The resulting
//! [`SimulationReport`] serializes to JSON and renders as plain text.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::ecdf::EmpiricalDistribution;
use crate::error::{Result, SimulationError};
use crate::estimation::{
    correlation, goodness_of_fit, interval_estimation, mean_estimation, variance_estimation,
    ConfidenceInterval, GoodnessOfFit,
};
use crate::matrix::ProbabilityMatrix;
use crate::random::create_rng;
use crate::sample::Sample;
use crate::sampler::DiscreteJointSampler;
use crate::validate::{validate_support, ProbabilityMatrixValidator};

/// X support of the bundled demonstration PMF.
pub const REFERENCE_X: [i64; 4] = [4, 8, 9, 11];
/// Y support of the bundled demonstration PMF.
pub const REFERENCE_Y: [i64; 3] = [3, 6, 8];

/// The bundled 4×3 demonstration PMF.
pub fn reference_matrix() -> Result<ProbabilityMatrix> {
    ProbabilityMatrix::new(vec![
        vec![0.05, 0.05, 0.10],
        vec![0.05, 0.15, 0.05],
        vec![0.10, 0.10, 0.15],
        vec![0.05, 0.05, 0.10],
    ])
}

/// Theoretical and empirical marginal of one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisComparison {
    /// Support values.
    pub support: Vec<i64>,
    /// Marginal of the input PMF.
    pub theoretical: Vec<f64>,
    /// Marginal of the drawn pairs.
    pub empirical: Vec<f64>,
}

impl AxisComparison {
    /// Largest `|empirical − theoretical|` over the support.
    pub fn max_deviation(&self) -> f64 {
        self.theoretical
            .iter()
            .zip(&self.empirical)
            .map(|(t, e)| (e - t).abs())
            .fold(0.0, f64::max)
    }
}

/// A statistic computed from the PMF and from the sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Value under the input PMF.
    pub theoretical: f64,
    /// Value under the empirical PMF.
    pub empirical: f64,
}

/// Everything a run measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Parameters of the run.
    pub config: SimulationConfig,
    /// Input PMF.
    pub theoretical: ProbabilityMatrix,
    /// Relative frequencies of the drawn pairs.
    pub empirical: ProbabilityMatrix,
    /// X marginals.
    pub x: AxisComparison,
    /// Y marginals.
    pub y: AxisComparison,
    /// `E[X]`.
    pub mean_x: Estimate,
    /// `E[Y]`.
    pub mean_y: Estimate,
    /// `Var X`.
    pub variance_x: Estimate,
    /// `Var Y`.
    pub variance_y: Estimate,
    /// `corr(X, Y)`; NaN (`null` in JSON) for a degenerate axis.
    pub correlation: Estimate,
    /// Interval for the X sample mean; `None` below two draws.
    pub x_interval: Option<ConfidenceInterval>,
    /// Interval for the Y sample mean; `None` below two draws.
    pub y_interval: Option<ConfidenceInterval>,
    /// Frequency table of the X projection.
    pub x_distribution: EmpiricalDistribution,
    /// Frequency table of the Y projection.
    pub y_distribution: EmpiricalDistribution,
    /// Chi-squared test of the empirical PMF against the input.
    pub goodness_of_fit: GoodnessOfFit,
}

impl SimulationReport {
    /// Returns true if the chi-squared test accepts the sample and both
    /// intervals (when present) cover the theoretical means.
    pub fn is_consistent(&self) -> bool {
        let covers = |ci: &Option<ConfidenceInterval>, mean: f64| {
            ci.as_ref().map_or(true, |ci| ci.contains(mean))
        };
        self.goodness_of_fit.consistent
            && covers(&self.x_interval, self.mean_x.theoretical)
            && covers(&self.y_interval, self.mean_y.theoretical)
    }
}

/// Validates the inputs, draws `config.volume` pairs with a generator seeded
/// from `config.seed`, and compares the sample with the PMF.
///
/// # Errors
/// `InvalidArgument` if the config is invalid, a support is empty or not
/// strictly ascending, or the PMF is not normalized within
/// `config.precision`; sampling errors propagate unchanged.
pub fn run_simulation(
    config: &SimulationConfig,
    matrix: &ProbabilityMatrix,
    x_support: &[i64],
    y_support: &[i64],
) -> Result<SimulationReport> {
    config.validate()?;
    if !validate_support(x_support) {
        return Err(SimulationError::invalid(
            "x_support",
            "must be non-empty and strictly ascending",
        ));
    }
    if !validate_support(y_support) {
        return Err(SimulationError::invalid(
            "y_support",
            "must be non-empty and strictly ascending",
        ));
    }
    let rows: Vec<&[f64]> = matrix.iter_rows().collect();
    if let Err(failure) = ProbabilityMatrixValidator::new(config.precision).check(&rows) {
        warn!(%failure, "probability matrix rejected");
        return Err(SimulationError::invalid("probabilities", failure.to_string()));
    }

    let sampler = DiscreteJointSampler::new(matrix.clone(), x_support.to_vec(), y_support.to_vec())?;
    let mut rng = create_rng(config.seed);
    let sample = sampler.generate(&mut rng, config.volume)?;
    let empirical = sample.empirical_matrix()?;
    let x_sample = sample.x_sample()?;
    let y_sample = sample.y_sample()?;

    let mean_x = Estimate {
        theoretical: mean_estimation(matrix.x_density(), x_support)?,
        empirical: mean_estimation(empirical.x_density(), x_support)?,
    };
    let mean_y = Estimate {
        theoretical: mean_estimation(matrix.y_density(), y_support)?,
        empirical: mean_estimation(empirical.y_density(), y_support)?,
    };
    let variance_x = Estimate {
        theoretical: variance_estimation(matrix.x_density(), mean_x.theoretical, x_support)?,
        empirical: variance_estimation(empirical.x_density(), mean_x.empirical, x_support)?,
    };
    let variance_y = Estimate {
        theoretical: variance_estimation(matrix.y_density(), mean_y.theoretical, y_support)?,
        empirical: variance_estimation(empirical.y_density(), mean_y.empirical, y_support)?,
    };
    let correlation = Estimate {
        theoretical: correlation(matrix, x_support, y_support)?,
        empirical: correlation(&empirical, x_support, y_support)?,
    };

    let fit = goodness_of_fit(&empirical, matrix, config.volume, config.confidence)?;
    debug!(
        statistic = fit.statistic,
        critical = fit.critical_value,
        df = fit.degrees_of_freedom,
        "chi-squared test"
    );

    let report = SimulationReport {
        config: *config,
        x: axis(x_support, matrix.x_density(), empirical.x_density()),
        y: axis(y_support, matrix.y_density(), empirical.y_density()),
        theoretical: matrix.clone(),
        empirical,
        mean_x,
        mean_y,
        variance_x,
        variance_y,
        correlation,
        x_interval: mean_interval(&x_sample, config.significance)?,
        y_interval: mean_interval(&y_sample, config.significance)?,
        x_distribution: EmpiricalDistribution::from_sample(&x_sample),
        y_distribution: EmpiricalDistribution::from_sample(&y_sample),
        goodness_of_fit: fit,
    };

    if !report.is_consistent() {
        warn!(
            statistic = fit.statistic,
            critical = fit.critical_value,
            seed = config.seed,
            "sample is inconsistent with the probability matrix"
        );
    }
    Ok(report)
}

fn axis(support: &[i64], theoretical: &[f64], empirical: &[f64]) -> AxisComparison {
    AxisComparison {
        support: support.to_vec(),
        theoretical: theoretical.to_vec(),
        empirical: empirical.to_vec(),
    }
}

fn mean_interval(sample: &Sample, significance: f64) -> Result<Option<ConfidenceInterval>> {
    if sample.volume() < 2 {
        return Ok(None);
    }
    interval_estimation(sample, significance).map(Some)
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "X: {}", join(&self.x.support))?;
        writeln!(f, "Y: {}", join(&self.y.support))?;
        writeln!(f, "Theoretical probability matrix:")?;
        write!(f, "{}", self.theoretical)?;
        writeln!(f, "Volume: {}", self.config.volume)?;
        writeln!(f)?;
        writeln!(f, "Empirical probability matrix:")?;
        write!(f, "{}", self.empirical)?;
        writeln!(f)?;

        let rows = [
            ("Mean X", self.mean_x),
            ("Mean Y", self.mean_y),
            ("Variance X", self.variance_x),
            ("Variance Y", self.variance_y),
            ("Correlation", self.correlation),
        ];
        writeln!(f, "{:<12} {:>14} {:>14}", "", "theoretical", "empirical")?;
        for (name, est) in rows {
            writeln!(f, "{name:<12} {:>14.6} {:>14.6}", est.theoretical, est.empirical)?;
        }
        writeln!(f)?;

        for (name, ci) in [("X", &self.x_interval), ("Y", &self.y_interval)] {
            if let Some(ci) = ci {
                writeln!(
                    f,
                    "Mean {name} interval ({}): [{:.6}, {:.6}]",
                    ci.significance,
                    ci.lower(),
                    ci.upper()
                )?;
            }
        }

        let fit = &self.goodness_of_fit;
        writeln!(
            f,
            "Chi-squared: {:.4} < {:.4} (df = {}, alpha = {}): {}",
            fit.statistic,
            fit.critical_value,
            fit.degrees_of_freedom,
            self.config.confidence,
            if fit.consistent { "consistent" } else { "rejected" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            volume: 20_000,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_reference_run() {
        let m = reference_matrix().unwrap();
        let report = run_simulation(&small_config(), &m, &REFERENCE_X, &REFERENCE_Y).unwrap();

        assert!((report.mean_x.theoretical - 8.15).abs() < 1e-12);
        assert!((report.mean_y.theoretical - 6.05).abs() < 1e-12);
        assert!((report.mean_x.empirical - 8.15).abs() < 0.1);
        assert!((report.variance_y.empirical - 3.8475).abs() < 0.2);
        assert!(report.x.max_deviation() < 0.02);
        assert!(report.y.max_deviation() < 0.02);
        assert_eq!(report.goodness_of_fit.degrees_of_freedom, 11);
        assert_eq!(report.x_distribution.total_count(), 20_000);
        assert_eq!(report.x_distribution.rows().len(), 4);

        let x_ci = report.x_interval.unwrap();
        assert!((x_ci.mean - report.mean_x.empirical).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_report() {
        let m = reference_matrix().unwrap();
        let a = run_simulation(&small_config(), &m, &REFERENCE_X, &REFERENCE_Y).unwrap();
        let b = run_simulation(&small_config(), &m, &REFERENCE_X, &REFERENCE_Y).unwrap();
        assert_eq!(a.empirical, b.empirical);
    }

    #[test]
    fn test_unnormalized_matrix_rejected() {
        let m = ProbabilityMatrix::new(vec![vec![0.5, 0.4]]).unwrap();
        let err = run_simulation(&small_config(), &m, &[1], &[1, 2]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidArgument { name: "probabilities", .. }));
    }

    #[test]
    fn test_negative_entry_with_unit_total_rejected() {
        let err = ProbabilityMatrix::new(vec![vec![0.6, -0.2, 0.6]])
            .and_then(|m| run_simulation(&small_config(), &m, &[1], &[1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidArgument { name: "probabilities", .. }));
    }

    #[test]
    fn test_unsorted_support_rejected() {
        let m = reference_matrix().unwrap();
        let err = run_simulation(&small_config(), &m, &[8, 4, 9, 11], &REFERENCE_Y).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidArgument { name: "x_support", .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let m = reference_matrix().unwrap();
        let config = SimulationConfig {
            volume: 0,
            ..SimulationConfig::default()
        };
        assert!(run_simulation(&config, &m, &REFERENCE_X, &REFERENCE_Y).is_err());
    }

    #[test]
    fn test_single_draw_has_no_interval() {
        let m = reference_matrix().unwrap();
        let config = SimulationConfig {
            volume: 1,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config, &m, &REFERENCE_X, &REFERENCE_Y).unwrap();
        assert!(report.x_interval.is_none());
        assert!(report.y_interval.is_none());
        assert!(report.correlation.empirical.is_nan());
    }

    #[test]
    fn test_degenerate_axis_reports_nan_correlation() {
        let m = ProbabilityMatrix::new(vec![vec![0.5, 0.5]]).unwrap();
        let report = run_simulation(&small_config(), &m, &[3], &[1, 2]).unwrap();
        assert!(report.correlation.theoretical.is_nan());
        assert_eq!(report.variance_x.theoretical, 0.0);
    }

    #[test]
    fn test_json_output() {
        let m = reference_matrix().unwrap();
        let config = SimulationConfig {
            volume: 1_000,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config, &m, &REFERENCE_X, &REFERENCE_Y).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["config"]["volume"], 1_000);
        assert_eq!(value["goodness_of_fit"]["degrees_of_freedom"], 11);
        assert_eq!(value["x"]["support"], serde_json::json!([4, 8, 9, 11]));
    }

    #[test]
    fn test_text_rendering() {
        let m = reference_matrix().unwrap();
        let config = SimulationConfig {
            volume: 1_000,
            ..SimulationConfig::default()
        };
        let text = run_simulation(&config, &m, &REFERENCE_X, &REFERENCE_Y)
            .unwrap()
            .to_string();
        assert!(text.starts_with("X: 4 8 9 11\nY: 3 6 8\n"));
        assert!(text.contains("Empirical probability matrix:"));
        assert!(text.contains("Volume: 1000"));
        assert!(text.contains("df = 11"));
    }
}
