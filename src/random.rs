//! Uniform variate sources and cumulative lookup tables.
//!
//! The sampler never touches global random state: every draw pulls from a
//! caller-supplied [`UniformSource`]. For reproducible runs use
//! [`create_rng`] with a fixed seed; the underlying algorithm (SmallRng) is
//! deterministic for a given seed on the same platform.

use rand::rngs::{SmallRng, StdRng};
use rand::Rng;

use crate::stats::compensated_prefix_sums;

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use jointsim::random::{create_rng, UniformSource};
/// let mut rng = create_rng(42);
/// let u = rng.next_uniform();
/// assert!((0.0..1.0).contains(&u));
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    use rand::SeedableRng;
    SmallRng::seed_from_u64(seed)
}

/// Source of independent uniform variates on `[0, 1)`.
///
/// Consumers must call it strictly sequentially; reproducibility depends on
/// the order of draws.
pub trait UniformSource {
    /// Next variate, uniformly distributed on `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for SmallRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl<U: UniformSource + ?Sized> UniformSource for &mut U {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Replays a fixed list of variates, wrapping around at the end.
///
/// Lets tests place a draw exactly on a cumulative boundary.
///
/// # Examples
/// ```
/// use jointsim::random::{SequenceSource, UniformSource};
/// let mut source = SequenceSource::new(vec![0.25, 0.75]);
/// assert_eq!(source.next_uniform(), 0.25);
/// assert_eq!(source.next_uniform(), 0.75);
/// assert_eq!(source.next_uniform(), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    /// Source replaying `values`.
    ///
    /// # Panics
    /// If `values` is empty or holds a value outside `[0, 1)`.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence source needs at least one value");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "sequence source values must lie in [0, 1)"
        );
        Self { values, cursor: 0 }
    }

    /// Number of variates handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Cumulative distribution over category indices, for inverse-transform
/// lookup.
///
/// Built from non-negative weights with compensated prefix sums and divided
/// by the total, so the last entry is exactly `1.0` and every `u ∈ [0, 1)`
/// maps to an index. A table whose weights sum to zero (or are not finite)
/// keeps its raw prefix sums; no variate maps into it.
///
/// # Complexity
/// - Construction: O(n)
/// - Lookup: O(n), a linear scan from index 0
///
/// # Examples
/// ```
/// use jointsim::random::CumulativeTable;
/// let table = CumulativeTable::new(&[1.0, 2.0, 1.0]);
/// assert_eq!(table.values(), &[0.25, 0.75, 1.0]);
/// assert_eq!(table.index_of(0.0), Some(0));
/// assert_eq!(table.index_of(0.25), Some(1));
/// assert_eq!(table.index_of(0.99), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeTable {
    cumulative: Vec<f64>,
    total: f64,
}

impl CumulativeTable {
    /// Builds the table from category weights.
    pub fn new(weights: &[f64]) -> Self {
        let mut cumulative = compensated_prefix_sums(weights);
        let total = cumulative.last().copied().unwrap_or(0.0);
        if total.is_finite() && total > 0.0 {
            for c in &mut cumulative {
                *c /= total;
            }
        }
        Self { cumulative, total }
    }

    /// Smallest index `i` with `value < F[i]`, scanning upward from 0.
    ///
    /// Half-open intervals: a value exactly on `F[i]` belongs to the next
    /// category, and `0.0` belongs to the first category with positive
    /// mass. Zero-mass categories are never returned.
    ///
    /// Returns `None` when no entry exceeds `value`, which only happens for
    /// `value >= 1`, NaN, or a degenerate table.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        self.cumulative.iter().position(|&f| value < f)
    }

    /// Cumulative values, ascending, ending at 1 for a proper table.
    pub fn values(&self) -> &[f64] {
        &self.cumulative
    }

    /// Sum of the weights before normalization.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Returns true if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
