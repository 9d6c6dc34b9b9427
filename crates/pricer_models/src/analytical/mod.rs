//! Analytical pricing formulas used as references for simulation results.
//!
//! - Black-Scholes call price, delta and `d1` as free functions
//! - [`AnalyticalFormula`]: capability trait binding an instrument to the
//!   model under which it has a closed form
//!
//! A pair without an implementation simply has no closed form; that is a
//! compile-time fact rather than a run-time lookup failure.

pub mod black_scholes;

pub use black_scholes::{black_scholes_call_delta, black_scholes_call_price, d1};

use pricer_core::types::{SimDate, SimulationError};

/// Closed-form valuation of an instrument under model `M`.
pub trait AnalyticalFormula<M> {
    /// Value at `date` given the current `spot` of the underlying.
    fn analytical_price(&self, date: SimDate, spot: f64, model: &M) -> Result<f64, SimulationError>;

    /// Sensitivity of [`analytical_price`](Self::analytical_price) to `spot`.
    fn analytical_delta(&self, date: SimDate, spot: f64, model: &M) -> Result<f64, SimulationError>;
}
