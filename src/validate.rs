//! Input checks that report an outcome instead of failing.
//!
//! Callers decide whether to proceed based on these results, so a failed
//! check is a value ([`ValidationFailure`]), never a
//! [`SimulationError`](crate::error::SimulationError).

use thiserror::Error;

/// Default normalization tolerance ε.
pub const DEFAULT_PRECISION: f64 = 1e-6;

/// Why a probability table failed normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    /// No table, or a table without entries.
    #[error("probability table is empty")]
    EmptyTable,
    /// The tolerance itself is negative (or NaN).
    #[error("precision must be non-negative, got {0}")]
    NegativePrecision(f64),
    /// An entry is NaN or outside `[0, 1]`.
    #[error("entry ({row}, {column}) = {value} is not a probability")]
    EntryOutOfRange {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The offending value.
        value: f64,
    },
    /// The running sum overshot `1 + ε` partway through the scan.
    #[error("running sum {sum} exceeds 1 at entry ({row}, {column})")]
    PartialSumExceeded {
        /// Row of the entry that pushed the sum over.
        row: usize,
        /// Column of the entry that pushed the sum over.
        column: usize,
        /// Running sum after that entry.
        sum: f64,
    },
    /// The grand total is not within ε of one.
    #[error("entries sum to {total}, expected 1 within {precision}")]
    TotalMismatch {
        /// Sum of all entries.
        total: f64,
        /// Tolerance applied.
        precision: f64,
    },
}

/// Checks that a joint PMF table sums to one.
///
/// Entries are accumulated in row-major order. The check fails on the
/// first entry outside `[0, 1]` or as soon as the running sum exceeds
/// `1 + ε`, and otherwise requires `|1 − total| < ε` at the end.
///
/// # Examples
/// ```
/// use jointsim::validate::ProbabilityMatrixValidator;
/// let table = vec![vec![0.1, 0.4, 0.1], vec![0.1, 0.1, 0.2]];
/// assert!(ProbabilityMatrixValidator::default().validate(&table));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityMatrixValidator {
    precision: f64,
}

impl ProbabilityMatrixValidator {
    /// Validator with tolerance `precision`.
    pub fn new(precision: f64) -> Self {
        Self { precision }
    }

    /// Tolerance applied by this validator.
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Returns `true` if `table` is normalized.
    pub fn validate<R: AsRef<[f64]>>(&self, table: &[R]) -> bool {
        self.check(table).is_ok()
    }

    /// Like [`validate`](Self::validate), naming the reason on failure.
    pub fn check<R: AsRef<[f64]>>(&self, table: &[R]) -> Result<(), ValidationFailure> {
        if self.precision.is_nan() || self.precision < 0.0 {
            return Err(ValidationFailure::NegativePrecision(self.precision));
        }
        if table.iter().all(|row| row.as_ref().is_empty()) {
            return Err(ValidationFailure::EmptyTable);
        }

        let mut sum = 0.0_f64;
        for (row, entries) in table.iter().enumerate() {
            for (column, &p) in entries.as_ref().iter().enumerate() {
                if !(0.0..=1.0).contains(&p) {
                    return Err(ValidationFailure::EntryOutOfRange {
                        row,
                        column,
                        value: p,
                    });
                }
                sum += p;
                if sum > 1.0 && !self.is_acceptable(sum) {
                    return Err(ValidationFailure::PartialSumExceeded { row, column, sum });
                }
            }
        }

        if self.is_acceptable(sum) {
            Ok(())
        } else {
            Err(ValidationFailure::TotalMismatch {
                total: sum,
                precision: self.precision,
            })
        }
    }

    fn is_acceptable(&self, sum: f64) -> bool {
        (1.0 - sum).abs() < self.precision
    }
}

impl Default for ProbabilityMatrixValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

/// Returns `true` if `support` is non-empty and strictly ascending.
///
/// # Examples
/// ```
/// use jointsim::validate::validate_support;
/// assert!(validate_support(&[1, 4, 5]));
/// assert!(!validate_support(&[1, 5, 3]));
/// assert!(!validate_support(&[]));
/// ```
pub fn validate_support(support: &[i64]) -> bool {
    !support.is_empty() && support.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_normalized() {
        let table = vec![vec![0.1, 0.4, 0.1], vec![0.1, 0.1, 0.2]];
        assert!(ProbabilityMatrixValidator::default().validate(&table));
    }

    #[test]
    fn test_accepts_reference_table() {
        let table = [
            [0.05, 0.05, 0.10],
            [0.05, 0.15, 0.05],
            [0.10, 0.10, 0.15],
            [0.05, 0.05, 0.10],
        ];
        assert_eq!(ProbabilityMatrixValidator::default().check(&table), Ok(()));
    }

    #[test]
    fn test_rejects_short_total() {
        let table = vec![vec![0.1, 0.4], vec![0.1, 0.3]];
        let err = ProbabilityMatrixValidator::default().check(&table).unwrap_err();
        assert!(matches!(err, ValidationFailure::TotalMismatch { .. }));
    }

    #[test]
    fn test_rejects_running_overshoot() {
        // Grand total is 1.0, but the scan passes 1.5 first
        let table = vec![vec![0.9, 0.6], vec![-0.5, 0.0]];
        let err = ProbabilityMatrixValidator::default().check(&table).unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::PartialSumExceeded {
                row: 0,
                column: 1,
                sum: 0.9 + 0.6
            }
        );
    }

    #[test]
    fn test_overshoot_within_precision_is_fine() {
        let table = vec![vec![0.5, 0.5 + 5e-7]];
        assert!(ProbabilityMatrixValidator::default().validate(&table));
        let table = vec![vec![0.5, 0.5 + 5e-6]];
        assert!(!ProbabilityMatrixValidator::default().validate(&table));
    }

    #[test]
    fn test_rejects_negative_precision() {
        let table = vec![vec![1.0]];
        let v = ProbabilityMatrixValidator::new(-1e-6);
        assert_eq!(v.check(&table), Err(ValidationFailure::NegativePrecision(-1e-6)));
        assert!(!ProbabilityMatrixValidator::new(f64::NAN).validate(&table));
    }

    #[test]
    fn test_rejects_absent_table() {
        let v = ProbabilityMatrixValidator::default();
        let empty: Vec<Vec<f64>> = vec![];
        assert_eq!(v.check(&empty), Err(ValidationFailure::EmptyTable));
        let no_entries: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(!v.validate(&no_entries));
    }

    #[test]
    fn test_rejects_nan_entry() {
        let table = vec![vec![0.5, f64::NAN, 0.5]];
        assert!(!ProbabilityMatrixValidator::default().validate(&table));
    }

    #[test]
    fn test_rejects_negative_entry_with_unit_total() {
        let table = vec![vec![0.6, -0.2, 0.6]];
        assert_eq!(
            ProbabilityMatrixValidator::default().check(&table),
            Err(ValidationFailure::EntryOutOfRange {
                row: 0,
                column: 1,
                value: -0.2
            })
        );
        let table = vec![vec![0.0], vec![1.2], vec![-0.2]];
        assert!(matches!(
            ProbabilityMatrixValidator::default().check(&table),
            Err(ValidationFailure::EntryOutOfRange { row: 1, column: 0, .. })
        ));
    }

    #[test]
    fn test_support_validation() {
        assert!(validate_support(&[7]));
        assert!(validate_support(&[4, 8, 9, 11]));
        assert!(!validate_support(&[3, 3]));
        assert!(!validate_support(&[9, 8]));
    }
}
