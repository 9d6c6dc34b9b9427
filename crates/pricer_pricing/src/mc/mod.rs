//! Monte Carlo orchestration and aggregation.
//!
//! # Architecture
//!
//! ```text
//! EngineConfig ──build_generator──▶ NoiseGenerator (shared, Rc)
//!                                        │ noises(date, ids)
//!                                   markets ◀── assets
//!                                        │
//! run_mc(assets) ──▶ SimulationOutput ──▶ get_mtm / get_delta ──▶ McResults
//! ```
//!
//! The run is single threaded and walks the dates in ascending order; every
//! object keeps its own date cache, so each market advances exactly once per
//! date whatever the number of assets reading it.

pub mod aggregate;
pub mod config;
pub mod runner;

pub use aggregate::{get_delta, get_mtm, mc_results, postpro, McResults, DEFAULT_CONFIDENCE};
pub use config::{EngineConfig, EngineConfigBuilder, MAX_PATHS};
pub use runner::{collect_markets, run_mc, PathSeries, SimulationOutput};
