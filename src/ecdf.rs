//! Empirical distribution table of a sample.
//!
//! One row per distinct value, ascending: the occurrence count `n_i`, the
//! relative frequency `w_i = n_i / n`, and the accumulated frequency
//! `Σ_{k≤i} w_k`. The last accumulated entry is rounded to the nearest
//! integer, which absorbs the floating-point drift of the running sum and
//! pins the table's end at exactly 1.

use serde::Serialize;

use crate::sample::Sample;

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyRow {
    /// Distinct sample value.
    pub value: f64,
    /// Number of occurrences.
    pub count: usize,
    /// `count / volume`.
    pub relative_frequency: f64,
    /// Running sum of relative frequencies up to and including this row.
    pub accumulated_frequency: f64,
}

/// Relative and accumulated frequencies of every distinct value.
///
/// # Examples
/// ```
/// use jointsim::ecdf::EmpiricalDistribution;
/// use jointsim::sample::Sample;
/// let sample = Sample::new([1.0, 2.0, 2.0, 3.0]).unwrap();
/// let dist = EmpiricalDistribution::from_sample(&sample);
/// assert_eq!(dist.total_count(), 4);
/// assert_eq!(dist.rows()[1].relative_frequency, 0.5);
/// assert_eq!(dist.rows()[2].accumulated_frequency, 1.0);
/// assert_eq!(dist.evaluate(2.5), 0.75);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmpiricalDistribution {
    rows: Vec<FrequencyRow>,
    total_count: usize,
    total_frequency: f64,
}

impl EmpiricalDistribution {
    /// Builds the table from a sample's occurrence counts.
    pub fn from_sample(sample: &Sample) -> Self {
        let volume = sample.volume() as f64;
        let mut rows = Vec::with_capacity(sample.occurrences().len());
        let mut accumulated = 0.0_f64;
        let mut total_count = 0_usize;
        for &(value, count) in sample.occurrences() {
            let relative_frequency = count as f64 / volume;
            accumulated += relative_frequency;
            total_count += count;
            rows.push(FrequencyRow {
                value,
                count,
                relative_frequency,
                accumulated_frequency: accumulated,
            });
        }
        let total_frequency = accumulated;
        if let Some(last) = rows.last_mut() {
            last.accumulated_frequency = last.accumulated_frequency.round();
        }

        Self {
            rows,
            total_count,
            total_frequency,
        }
    }

    /// Table rows, ascending by value.
    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    /// Sum of counts; equals the sample volume.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Sum of relative frequencies before rounding (≈ 1).
    pub fn total_frequency(&self) -> f64 {
        self.total_frequency
    }

    /// Step-function value of the empirical CDF at `x`: the accumulated
    /// frequency of the largest value `≤ x`, or 0 below the minimum.
    pub fn evaluate(&self, x: f64) -> f64 {
        let idx = self.rows.partition_point(|row| row.value <= x);
        if idx == 0 {
            0.0
        } else {
            self.rows[idx - 1].accumulated_frequency
        }
    }
}
