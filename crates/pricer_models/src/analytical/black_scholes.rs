//! Black-Scholes formulas for European calls.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Call Delta**: Δ = N(d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use pricer_core::math::norm_cdf;
use pricer_core::types::{SimDate, SimulationError};

use super::AnalyticalFormula;
use crate::instruments::EuropeanCall;
use crate::models::BlackScholesMarket;

fn validate_inputs(spot: f64, strike: f64, sigma: f64, ttm: f64) -> Result<(), SimulationError> {
    if !(spot.is_finite() && spot > 0.0) {
        return Err(SimulationError::invalid_parameter(
            "spot",
            format!("must be positive, got {}", spot),
        ));
    }
    if !(strike.is_finite() && strike > 0.0) {
        return Err(SimulationError::invalid_parameter(
            "strike",
            format!("must be positive, got {}", strike),
        ));
    }
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(SimulationError::invalid_parameter(
            "sigma",
            format!("must be non-negative, got {}", sigma),
        ));
    }
    if !ttm.is_finite() {
        return Err(SimulationError::invalid_parameter(
            "ttm",
            format!("must be finite, got {}", ttm),
        ));
    }
    Ok(())
}

/// The d₁ term of the Black-Scholes formula.
///
/// Requires `sigma * sqrt(ttm) > 0`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::d1;
///
/// // ATM, zero rate: d1 = sigma * sqrt(T) / 2
/// assert!((d1(100.0, 100.0, 0.0, 0.2, 1.0).unwrap() - 0.1).abs() < 1e-12);
/// assert!(d1(100.0, 100.0, 0.0, 0.0, 1.0).is_err());
/// ```
pub fn d1(spot: f64, strike: f64, rate: f64, sigma: f64, ttm: f64) -> Result<f64, SimulationError> {
    validate_inputs(spot, strike, sigma, ttm)?;
    let vol_sqrt_t = sigma * ttm.max(0.0).sqrt();
    if vol_sqrt_t <= 0.0 {
        return Err(SimulationError::invalid_parameter(
            "sigma",
            "d1 needs a positive total volatility",
        ));
    }
    Ok(((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * ttm) / vol_sqrt_t)
}

/// Black-Scholes price of a European call with time to maturity `ttm`.
///
/// Degenerate cases:
/// - `ttm < 0`: the option has expired, price 0
/// - `sigma * sqrt(ttm) == 0`: discounted intrinsic value `max(S - K·e^(-rT), 0)`
///
/// # Examples
/// ```
/// use pricer_models::analytical::black_scholes_call_price;
///
/// let price = black_scholes_call_price(100.0, 100.0, 0.0, 0.2, 1.0).unwrap();
/// assert!((price - 7.965567).abs() < 1e-4);
/// ```
pub fn black_scholes_call_price(
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    ttm: f64,
) -> Result<f64, SimulationError> {
    validate_inputs(spot, strike, sigma, ttm)?;
    if ttm < 0.0 {
        return Ok(0.0);
    }
    let discounted_strike = strike * (-rate * ttm).exp();
    if sigma * ttm.sqrt() <= 0.0 {
        return Ok((spot - discounted_strike).max(0.0));
    }
    let d1 = d1(spot, strike, rate, sigma, ttm)?;
    let d2 = d1 - sigma * ttm.sqrt();
    Ok(spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2))
}

/// Black-Scholes delta `N(d₁)` of a European call.
///
/// Degenerate cases mirror [`black_scholes_call_price`]: 0 after expiry and
/// the indicator `S > K·e^(-rT)` without total volatility.
pub fn black_scholes_call_delta(
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    ttm: f64,
) -> Result<f64, SimulationError> {
    validate_inputs(spot, strike, sigma, ttm)?;
    if ttm < 0.0 {
        return Ok(0.0);
    }
    if sigma * ttm.sqrt() <= 0.0 {
        let discounted_strike = strike * (-rate * ttm).exp();
        return Ok(if spot > discounted_strike { 1.0 } else { 0.0 });
    }
    Ok(norm_cdf(d1(spot, strike, rate, sigma, ttm)?))
}

impl AnalyticalFormula<BlackScholesMarket> for EuropeanCall {
    fn analytical_price(
        &self,
        date: SimDate,
        spot: f64,
        model: &BlackScholesMarket,
    ) -> Result<f64, SimulationError> {
        let ttm = self.maturity().years_since(date);
        black_scholes_call_price(spot, self.strike(), model.rate(), model.sigma(), ttm)
    }

    fn analytical_delta(
        &self,
        date: SimDate,
        spot: f64,
        model: &BlackScholesMarket,
    ) -> Result<f64, SimulationError> {
        let ttm = self.maturity().years_since(date);
        black_scholes_call_delta(spot, self.strike(), model.rate(), model.sigma(), ttm)
    }
}
