//! Equal-population density histogram.
//!
//! The sorted sample is split into `M = sample.interval_count()` runs of
//! `k = ⌊n / M⌋` values; the last run also takes the remainder. Interval
//! boundaries sit halfway between the last value of one run and the first
//! value of the next, and each interval gets density `(1/M) / width`, so
//! the histogram's total area is 1.
//!
//! Heavily repeated values (a discrete sample, say) can put both sides of a
//! split on the same number. That yields a zero-width bucket, which is
//! reported as an invariant violation instead of an infinite density.

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::sample::Sample;
use crate::stats::kahan_sum_iter;

/// Frequentist density histogram with equal-population intervals.
///
/// # Examples
/// ```
/// use jointsim::histogram::Histogram;
/// use jointsim::sample::Sample;
/// let sample = Sample::new((1..=9).map(f64::from)).unwrap();
/// let h = Histogram::from_sample(&sample).unwrap();
/// assert_eq!(h.interval_count(), 3);
/// assert_eq!(h.left_bounds(), &[1.0, 3.5, 6.5]);
/// assert_eq!(h.right_bounds(), &[3.5, 6.5, 9.0]);
/// assert!((h.total_area() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    volume: usize,
    interval_count: usize,
    items_per_interval: usize,
    left_bounds: Vec<f64>,
    right_bounds: Vec<f64>,
    widths: Vec<f64>,
    densities: Vec<f64>,
    bucket_counts: Vec<usize>,
}

impl Histogram {
    /// Builds the histogram of `sample`.
    ///
    /// # Errors
    /// `InvariantViolation` if any interval has zero width.
    pub fn from_sample(sample: &Sample) -> Result<Self> {
        let values = sample.values();
        let volume = values.len();
        let intervals = sample.interval_count();
        let items_per_interval = volume / intervals;
        let factor = 1.0 / intervals as f64;

        let mut left_bounds = Vec::with_capacity(intervals);
        let mut right_bounds = Vec::with_capacity(intervals);
        left_bounds.push(values[0]);
        for i in 1..intervals {
            let split = i * items_per_interval;
            let boundary = (values[split - 1] + values[split]) / 2.0;
            right_bounds.push(boundary);
            left_bounds.push(boundary);
        }
        right_bounds.push(values[volume - 1]);

        let mut widths = Vec::with_capacity(intervals);
        let mut densities = Vec::with_capacity(intervals);
        for (i, (&a, &b)) in left_bounds.iter().zip(&right_bounds).enumerate() {
            let width = b - a;
            if !(width > 0.0) {
                return Err(SimulationError::invariant(format!(
                    "histogram interval {i} is degenerate: [{a}, {b}]"
                )));
            }
            widths.push(width);
            densities.push(factor / width);
        }

        // Half-open buckets, the last one closed at the sample maximum
        let bucket_counts = left_bounds
            .iter()
            .zip(&right_bounds)
            .enumerate()
            .map(|(i, (&a, &b))| {
                let upper = if i + 1 == intervals { f64::INFINITY } else { b };
                sample.count_in(a, upper)
            })
            .collect();

        Ok(Self {
            volume,
            interval_count: intervals,
            items_per_interval,
            left_bounds,
            right_bounds,
            widths,
            densities,
            bucket_counts,
        })
    }

    /// Number of values binned.
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Number of intervals `M`.
    pub fn interval_count(&self) -> usize {
        self.interval_count
    }

    /// Values per interval `k = ⌊n / M⌋` (the last interval may hold more).
    pub fn items_per_interval(&self) -> usize {
        self.items_per_interval
    }

    /// Left bound of each interval.
    pub fn left_bounds(&self) -> &[f64] {
        &self.left_bounds
    }

    /// Right bound of each interval.
    pub fn right_bounds(&self) -> &[f64] {
        &self.right_bounds
    }

    /// Width of each interval.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Density `(1/M) / width` of each interval.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// Number of sample values in each interval `[left, right)`; the last
    /// interval also takes values equal to its right bound.
    ///
    /// Ties across a split can make these differ from `k`.
    pub fn bucket_counts(&self) -> &[usize] {
        &self.bucket_counts
    }

    /// `Σ width · density`, 1 up to rounding.
    pub fn total_area(&self) -> f64 {
        kahan_sum_iter(self.widths.iter().zip(&self.densities).map(|(w, d)| w * d))
    }
}
