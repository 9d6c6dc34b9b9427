//! Simulated markets.
//!
//! - [`BlackScholesMarket`]: single exponential-Brownian price process
//! - [`BlackScholesBasketModel`]: several correlated exponential-Brownian
//!   components sharing one rate and one noise draw per date, exposed as
//!   individual [`Market`](pricer_core::traits::Market) views
//!
//! Both simulate exactly from one date to the next:
//! ```text
//! X(t2) = X(t1) * exp((r - 0.5*sigma^2)*dt + sigma*sqrt(dt)*Z)
//! ```
//! with `X(0) = 1` and the spot being `S0 * X(t)`, so no time grid is needed.

pub mod basket;
pub mod black_scholes;

pub use basket::{BasketComponent, BlackScholesBasketModel, ComponentMarket};
pub use black_scholes::BlackScholesMarket;

use pricer_core::cache::{CacheError, KeyPart, MemoCache};
use pricer_core::types::{PathValue, SimDate, SimulationError};

pub(crate) const SIMULATE: &str = "simulate";
pub(crate) const SPOT: &str = "spot";
pub(crate) const DISCOUNT_FACTOR: &str = "discount_factor";
pub(crate) const DISCOUNT_FACTOR_BETWEEN: &str = "discount_factor_between";

/// Checks the parameters of one exponential-Brownian process.
pub(crate) fn validate_dynamics(
    initial_value: f64,
    rate: f64,
    sigma: f64,
) -> Result<(), SimulationError> {
    if !(initial_value.is_finite() && initial_value > 0.0) {
        return Err(SimulationError::invalid_parameter(
            "initial_value",
            format!("must be positive and finite, got {}", initial_value),
        ));
    }
    if !rate.is_finite() {
        return Err(SimulationError::invalid_parameter(
            "rate",
            format!("must be finite, got {}", rate),
        ));
    }
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(SimulationError::invalid_parameter(
            "sigma",
            format!("must be non-negative and finite, got {}", sigma),
        ));
    }
    Ok(())
}

/// Last simulated `(date, state)` of `simulate(args)`, or the origin state.
pub(crate) fn previous_state(
    cache: &MemoCache<PathValue>,
    args: &[KeyPart],
) -> Result<(SimDate, PathValue), SimulationError> {
    match cache.previous(SIMULATE, args) {
        Ok(state) => Ok(state),
        Err(CacheError::NoHistory(_)) => Ok((SimDate::ORIGIN, PathValue::Constant(1.0))),
        Err(err) => Err(err.into()),
    }
}

/// One exact step of the normalised process.
///
/// `noise` holds one standard normal draw per path.
pub(crate) fn advance(
    previous: &PathValue,
    rate: f64,
    sigma: f64,
    dt: f64,
    noise: &[f64],
) -> Result<PathValue, SimulationError> {
    let drift = (rate - 0.5 * sigma * sigma) * dt;
    let diffusion = sigma * dt.sqrt();
    let growth = PathValue::from_vec(noise.iter().map(|&z| (drift + diffusion * z).exp()).collect());
    previous.zip_with(&growth, |x, g| x * g)
}
