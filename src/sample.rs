//! One-dimensional sample of scalar draws.
//!
//! A [`Sample`] is usually the X or Y projection of simulated pairs. The
//! values are sorted once on construction, and every derived quantity
//! (mean, both variances, occurrence counts, interval count) is computed
//! there as well. Nothing is recomputed on read.

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::stats::{self, sum_of_squared_deviations};

/// Immutable ascending sample with precomputed moments.
///
/// # Examples
/// ```
/// use jointsim::sample::Sample;
/// let s = Sample::new([3.0, 1.0, 2.0, 2.0]).unwrap();
/// assert_eq!(s.values(), &[1.0, 2.0, 2.0, 3.0]);
/// assert_eq!(s.mean(), 2.0);
/// assert_eq!(s.biased_variance(), 0.5);
/// assert_eq!(s.occurrences(), &[(1.0, 1), (2.0, 2), (3.0, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<f64>,
    occurrences: Vec<(f64, usize)>,
    mean: f64,
    biased_variance: f64,
    unbiased_variance: Option<f64>,
    interval_count: usize,
}

impl Sample {
    /// Builds a sample from raw draws in any order.
    ///
    /// # Errors
    /// `InvalidArgument` if there are no values or any value is NaN or
    /// infinite.
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Result<Self> {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(f64::total_cmp);
        let Some(mean) = stats::mean(&values) else {
            let reason = match values.iter().find(|v| !v.is_finite()) {
                Some(bad) => format!("non-finite value {bad}"),
                None => "no values".to_string(),
            };
            return Err(SimulationError::invalid("sample", reason));
        };

        let n = values.len();
        let squares = sum_of_squared_deviations(&values, mean);
        let biased_variance = squares / n as f64;
        let unbiased_variance = (n > 1).then(|| squares / (n - 1) as f64);

        let mut occurrences: Vec<(f64, usize)> = Vec::new();
        for &v in &values {
            match occurrences.last_mut() {
                Some((last, count)) if *last == v => *count += 1,
                _ => occurrences.push((v, 1)),
            }
        }

        let interval_count = interval_count_for(n);

        Ok(Self {
            values,
            occurrences,
            mean,
            biased_variance,
            unbiased_variance,
            interval_count,
        })
    }

    /// Builds a sample from integer draws (support values).
    pub fn from_integers<I: IntoIterator<Item = i64>>(values: I) -> Result<Self> {
        Self::new(values.into_iter().map(|v| v as f64))
    }

    /// Number of values.
    pub fn volume(&self) -> usize {
        self.values.len()
    }

    /// Values in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest value.
    pub fn min(&self) -> f64 {
        self.values[0]
    }

    /// Largest value.
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations divided by the volume.
    pub fn biased_variance(&self) -> f64 {
        self.biased_variance
    }

    /// Sum of squared deviations divided by `volume − 1`; `None` for a
    /// single value.
    pub fn unbiased_variance(&self) -> Option<f64> {
        self.unbiased_variance
    }

    /// Distinct values in ascending order, each with its count.
    pub fn occurrences(&self) -> &[(f64, usize)] {
        &self.occurrences
    }

    /// Number of histogram intervals for this volume: `⌊√n⌋` up to 100
    /// values, `⌊4·log10(n)⌋` beyond.
    pub fn interval_count(&self) -> usize {
        self.interval_count
    }

    /// Number of values in `[lower, upper)`.
    pub fn count_in(&self, lower: f64, upper: f64) -> usize {
        if !(lower < upper) {
            return 0;
        }
        let start = self.values.partition_point(|&v| v < lower);
        let end = self.values.partition_point(|&v| v < upper);
        end - start
    }
}

fn interval_count_for(volume: usize) -> usize {
    let n = volume as f64;
    if volume <= 100 {
        n.sqrt().floor() as usize
    } else {
        (4.0 * n.log10()).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_moments() {
        let s = Sample::new([1.0, 2.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.volume(), 4);
        assert_eq!(s.mean(), 2.0);
        assert_eq!(s.biased_variance(), 0.5);
        assert!((s.unbiased_variance().unwrap() - 0.667).abs() < 1e-3);
    }

    #[test]
    fn test_sorted_and_bounds() {
        let s = Sample::new([9.0, -1.0, 4.0, 4.0, 0.5]).unwrap();
        assert_eq!(s.values(), &[-1.0, 0.5, 4.0, 4.0, 9.0]);
        assert_eq!(s.min(), -1.0);
        assert_eq!(s.max(), 9.0);
    }

    #[test]
    fn test_single_value() {
        let s = Sample::new([5.0]).unwrap();
        assert_eq!(s.mean(), 5.0);
        assert_eq!(s.biased_variance(), 0.0);
        assert_eq!(s.unbiased_variance(), None);
        assert_eq!(s.interval_count(), 1);
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(Sample::new(Vec::<f64>::new()).is_err());
        assert!(Sample::new([1.0, f64::NAN]).is_err());
        assert!(Sample::new([f64::INFINITY]).is_err());
    }

    #[test]
    fn test_occurrences_from_integers() {
        let s = Sample::from_integers([8, 4, 8, 11, 9, 8, 4]).unwrap();
        assert_eq!(
            s.occurrences(),
            &[(4.0, 2), (8.0, 3), (9.0, 1), (11.0, 1)]
        );
        let total: usize = s.occurrences().iter().map(|&(_, c)| c).sum();
        assert_eq!(total, s.volume());
    }

    #[test]
    fn test_interval_count_rule() {
        assert_eq!(interval_count_for(1), 1);
        assert_eq!(interval_count_for(10), 3);
        assert_eq!(interval_count_for(99), 9);
        assert_eq!(interval_count_for(100), 10);
        assert_eq!(interval_count_for(101), 8);
        assert_eq!(interval_count_for(1000), 12);
        assert_eq!(interval_count_for(100_000), 20);
    }

    #[test]
    fn test_count_in_half_open() {
        let s = Sample::new([1.0, 2.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.count_in(2.0, 3.0), 2);
        assert_eq!(s.count_in(0.0, 10.0), 5);
        assert_eq!(s.count_in(4.0, 4.0), 0);
        assert_eq!(s.count_in(5.0, 1.0), 0);
    }

    #[test]
    fn test_reads_are_bit_identical() {
        let s = Sample::new((0..1000).map(|i| ((i * 7919) % 1000) as f64 / 7.0)).unwrap();
        let m = s.mean();
        let v = s.unbiased_variance();
        for _ in 0..5 {
            assert_eq!(s.mean().to_bits(), m.to_bits());
            assert_eq!(s.unbiased_variance().map(f64::to_bits), v.map(f64::to_bits));
        }
    }
}
