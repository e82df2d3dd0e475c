//! # jointsim
//!
//! Simulation of a two-dimensional discrete random variable `(X, Y)` from
//! its joint probability mass function, and statistical checks that the
//! simulated sample agrees with the distribution it was drawn from.
//!
//! ## Modules
//!
//! - [`matrix`]: joint PMF table with cached marginals
//! - [`validate`]: normalization and support checks
//! - [`random`]: seeded uniform sources and cumulative lookup tables
//! - [`sampler`]: two-stage inverse-transform sampler
//! - [`sample`], [`ecdf`], [`histogram`]: one-dimensional sample analysis
//! - [`estimation`]: point and interval estimates, correlation, chi-squared test
//! - [`special`], [`stats`]: numerical building blocks
//! - [`config`], [`report`]: end-to-end runs
//!
//! ## Example
//!
//! ```
//! use jointsim::config::SimulationConfig;
//! use jointsim::report::{reference_matrix, run_simulation, REFERENCE_X, REFERENCE_Y};
//!
//! let config = SimulationConfig { volume: 5_000, ..SimulationConfig::default() };
//! let matrix = reference_matrix().unwrap();
//! let report = run_simulation(&config, &matrix, &REFERENCE_X, &REFERENCE_Y).unwrap();
//! assert!((report.mean_x.theoretical - 8.15).abs() < 1e-12);
//! assert!((report.mean_x.empirical - 8.15).abs() < 0.25);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: compensated summation for marginals,
//!   cumulative tables and moments; two-pass variance
//! - **No hidden state**: every random draw comes from a caller-supplied
//!   [`random::UniformSource`]
//! - **Property-based testing**: invariants verified via proptest

pub mod config;
pub mod ecdf;
pub mod error;
pub mod estimation;
pub mod histogram;
pub mod matrix;
pub mod random;
pub mod report;
pub mod sample;
pub mod sampler;
pub mod special;
pub mod stats;
pub mod validate;

pub use error::{Result, SimulationError};
pub use matrix::ProbabilityMatrix;
pub use sampler::{DiscreteJointSampler, JointSample};
