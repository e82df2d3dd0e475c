//! Numerically careful accumulation primitives.
//!
//! Probability tables and samples are summed many times over (marginals,
//! cumulative tables, means, chi-squared terms). These helpers keep the
//! rounding error of those sums independent of the number of terms.
//!
//! # Algorithms
//!
//! - **Sums**: Neumaier's variant of Kahan compensated summation.
//! - **Variance**: two-pass, mean first, then compensated squared
//!   deviations.

// ---------------------------------------------------------------------------
// Kahan compensated summation
// ---------------------------------------------------------------------------

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.
///
/// # Examples
/// ```
/// use jointsim::stats::kahan_sum;
/// let v = [0.1; 10];
/// assert_eq!(kahan_sum(&v), 1.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    kahan_sum_iter(data.iter().copied())
}

/// Iterator form of [`kahan_sum`], for sums over strided or computed terms
/// (matrix columns, weighted products) without collecting them first.
pub fn kahan_sum_iter<I: IntoIterator<Item = f64>>(terms: I) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for x in terms {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Running prefix sums with Neumaier compensation.
///
/// `out[i]` is the compensated sum of `data[..=i]`. Used for cumulative
/// distribution tables, where drift in late entries decides whether a
/// uniform variate close to 1 still finds an index.
pub fn compensated_prefix_sums(data: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
        out.push(sum + c);
    }
    out
}

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

/// Computes the arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use jointsim::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(mean(&v), Some(3.0));
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Compensated sum of `(x − center)²` over `data`.
///
/// Two-pass form: callers compute `center` (normally the mean) first, which
/// avoids the cancellation of `E[X²] − (E[X])²`.
///
/// # Examples
/// ```
/// use jointsim::stats::sum_of_squared_deviations;
/// assert_eq!(sum_of_squared_deviations(&[1.0, 2.0, 2.0, 3.0], 2.0), 2.0);
/// ```
pub fn sum_of_squared_deviations(data: &[f64], center: f64) -> f64 {
    kahan_sum_iter(data.iter().map(|&x| (x - center) * (x - center)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn mean_within_bounds(data in proptest::collection::vec(-1e6_f64..1e6, 1..=100)) {
            let m = mean(&data).unwrap();
            let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m >= lo - 1e-9 && m <= hi + 1e-9);
        }

        #[test]
        fn deviations_minimized_at_mean(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=100),
            shift in 0.01_f64..10.0,
        ) {
            let m = mean(&data).unwrap();
            let at_mean = sum_of_squared_deviations(&data, m);
            prop_assert!(at_mean >= 0.0);
            prop_assert!(at_mean <= sum_of_squared_deviations(&data, m + shift));
        }
    }
}
