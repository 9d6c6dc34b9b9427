//! EfficientMC CLI - Monte Carlo pricing from the command line
//!
//! # Commands
//!
//! - `efficientmc run --config <file.toml>` - Price the portfolio of a run configuration
//! - `efficientmc demo` - Price three Black-Scholes calls next to their closed form
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires configuration into
//! the pricer layers: markets and instruments from `pricer_models`, noise
//! generation and the engine from `pricer_pricing`.

use clap::{Parser, Subcommand};
use pricer_pricing::rng::SamplingKind;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

/// EfficientMC Monte Carlo Pricing CLI
#[derive(Parser)]
#[command(name = "efficientmc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "efficientmc.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price the portfolio described by the configuration file
    Run {
        /// Sampling strategy (independent, antithetic, latin_hypercube, sobol, ...)
        #[arg(short, long)]
        sampling: Option<SamplingKind>,

        /// Number of Monte Carlo paths
        #[arg(short, long)]
        n_sims: Option<usize>,

        /// Seed of the pseudo-random samplers
        #[arg(long)]
        seed: Option<u64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Price ITM, ATM and OTM calls against Black-Scholes
    Demo {
        /// Sampling strategy; independent and antithetic when omitted
        #[arg(short, long)]
        sampling: Option<SamplingKind>,

        /// Number of Monte Carlo paths
        #[arg(short, long, default_value = "500000")]
        n_sims: usize,

        /// Seed of the pseudo-random samplers
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

fn init_tracing(verbose: bool) {
    // Logs go to stderr so JSON output stays machine readable.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!("Verbose mode enabled");

    match cli.command {
        Commands::Run {
            sampling,
            n_sims,
            seed,
            format,
        } => commands::run::run(
            &cli.config,
            commands::run::RunOverrides {
                sampling,
                n_sims,
                seed,
            },
            &format,
        ),
        Commands::Demo {
            sampling,
            n_sims,
            seed,
            format,
        } => commands::demo::run(sampling, n_sims, seed, &format),
    }
}
