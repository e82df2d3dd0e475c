//! Draws pairs from the bundled 4×3 PMF and prints how the sample compares
//! with theory.
//!
//! Settings resolve as defaults, then `JOINTSIM_*` variables, then flags.

use std::process::ExitCode;

use clap::Parser;
use jointsim::config::SimulationConfig;
use jointsim::report::{reference_matrix, run_simulation, REFERENCE_X, REFERENCE_Y};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Simulate a discrete joint random variable and test the sample against its PMF")]
#[command(version)]
struct Cli {
    /// Number of pairs to draw [default: 100000]
    #[arg(long)]
    volume: Option<usize>,

    /// Confidence level of the mean intervals [default: 0.95]
    #[arg(long)]
    significance: Option<f64>,

    /// Significance level of the chi-squared test [default: 0.05]
    #[arg(long)]
    confidence: Option<f64>,

    /// Seed of the uniform generator [default: 2021]
    #[arg(long)]
    seed: Option<u64>,

    /// Tolerance of the PMF normalization check [default: 1e-6]
    #[arg(long)]
    precision: Option<f64>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default().with_env_overrides();
        if let Some(volume) = self.volume {
            config.volume = volume;
        }
        if let Some(significance) = self.significance {
            config.significance = significance;
        }
        if let Some(confidence) = self.confidence {
            config.confidence = confidence;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        config
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    info!(volume = config.volume, seed = config.seed, "starting simulation");

    let report = match reference_matrix()
        .and_then(|matrix| run_simulation(&config, &matrix, &REFERENCE_X, &REFERENCE_Y))
    {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{report}");
    }
    ExitCode::SUCCESS
}
