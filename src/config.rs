//! Run configuration for a simulation.
//!
//! Values come from [`Default`], then `JOINTSIM_*` environment variables,
//! then (in the binary) command-line flags, each layer overriding the last.
//!
//! | Variable | Field |
//! |---|---|
//! | `JOINTSIM_VOLUME` | `volume` |
//! | `JOINTSIM_SEED` | `seed` |
//! | `JOINTSIM_SIGNIFICANCE` | `significance` |
//! | `JOINTSIM_CONFIDENCE` | `confidence` |
//! | `JOINTSIM_PRECISION` | `precision` |
//!
//! A variable that is unset or does not parse leaves the field unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_probability, Result, SimulationError};
use crate::validate::DEFAULT_PRECISION;

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of pairs to draw.
    pub volume: usize,
    /// Confidence level of the mean intervals.
    pub significance: f64,
    /// Significance level α of the chi-squared test.
    pub confidence: f64,
    /// Seed of the uniform generator.
    pub seed: u64,
    /// Tolerance of the PMF normalization check.
    pub precision: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            volume: 100_000,
            significance: 0.95,
            confidence: 0.05,
            seed: 2021,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl SimulationConfig {
    /// Checks every field.
    ///
    /// # Errors
    /// `InvalidArgument` for a zero volume, a probability outside `[0, 1]`,
    /// or a negative or NaN precision.
    pub fn validate(&self) -> Result<()> {
        if self.volume == 0 {
            return Err(SimulationError::invalid("volume", "must be positive"));
        }
        ensure_probability("significance", self.significance)?;
        ensure_probability("confidence", self.confidence)?;
        if !(self.precision >= 0.0) {
            return Err(SimulationError::invalid(
                "precision",
                format!("{} should be non-negative", self.precision),
            ));
        }
        Ok(())
    }

    /// Applies `JOINTSIM_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, keyed by variable name.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn read<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }

        if let Some(v) = read(&lookup, "JOINTSIM_VOLUME") {
            self.volume = v;
        }
        if let Some(v) = read(&lookup, "JOINTSIM_SEED") {
            self.seed = v;
        }
        if let Some(v) = read(&lookup, "JOINTSIM_SIGNIFICANCE") {
            self.significance = v;
        }
        if let Some(v) = read(&lookup, "JOINTSIM_CONFIDENCE") {
            self.confidence = v;
        }
        if let Some(v) = read(&lookup, "JOINTSIM_PRECISION") {
            self.precision = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let c = SimulationConfig::default();
        assert_eq!(c.volume, 100_000);
        assert_eq!(c.significance, 0.95);
        assert_eq!(c.confidence, 0.05);
        assert_eq!(c.seed, 2021);
        assert_eq!(c.precision, 1e-6);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_overrides_apply() {
        let c = SimulationConfig::default().with_overrides_from(lookup(&[
            ("JOINTSIM_VOLUME", "500"),
            ("JOINTSIM_SEED", " 7 "),
            ("JOINTSIM_CONFIDENCE", "0.01"),
        ]));
        assert_eq!(c.volume, 500);
        assert_eq!(c.seed, 7);
        assert_eq!(c.confidence, 0.01);
        assert_eq!(c.significance, 0.95);
    }

    #[test]
    fn test_unparsable_overrides_ignored() {
        let c = SimulationConfig::default().with_overrides_from(lookup(&[
            ("JOINTSIM_VOLUME", "lots"),
            ("JOINTSIM_SEED", "-3"),
            ("JOINTSIM_PRECISION", ""),
        ]));
        assert_eq!(c, SimulationConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let base = SimulationConfig::default();
        assert!(SimulationConfig { volume: 0, ..base }.validate().is_err());
        assert!(SimulationConfig { significance: 1.5, ..base }.validate().is_err());
        assert!(SimulationConfig { confidence: -0.1, ..base }.validate().is_err());
        assert!(SimulationConfig { precision: -1e-6, ..base }.validate().is_err());
        assert!(SimulationConfig { precision: f64::NAN, ..base }.validate().is_err());
        assert!(SimulationConfig { precision: 0.0, ..base }.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let c = SimulationConfig { volume: 42, seed: 9, ..SimulationConfig::default() };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"volume\":42"));
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
