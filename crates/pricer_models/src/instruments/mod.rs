//! Instruments priced by simulation.
//!
//! Every instrument implements [`Asset`](pricer_core::traits::Asset) and owns
//! a [`MemoCache`](pricer_core::cache::MemoCache), so repeated queries at a
//! date reuse the same payoff evaluation.
//!
//! # Instrument Types
//!
//! - [`EuropeanCall`]: call on one market
//! - [`SpreadOption`]: call on the spread between two markets
//! - [`BasketCall`]: call on a weighted sum of markets
//!
//! Cash-flows are paid at maturity and discounted with the first market's
//! discount factor. Volumes are the quantity of each market delivered on
//! exercise: `+1` for a call's underlying, `-1` for the short leg of a
//! spread, the weight for a basket component.

mod basket;
mod european;
mod spread;

pub use basket::BasketCall;
pub use european::EuropeanCall;
pub use spread::SpreadOption;

use std::rc::Rc;

use pricer_core::traits::Market;
use pricer_core::types::{PathValue, SimDate, SimulationError};

pub(crate) const CASHFLOW: &str = "cashflow";
pub(crate) const DISCOUNTED_CASHFLOW: &str = "discounted_cashflow";
pub(crate) const EXERCISED: &str = "exercised";
pub(crate) const VOLUME: &str = "volume";

pub(crate) fn validate_strike(strike: f64) -> Result<(), SimulationError> {
    if strike.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            "strike",
            format!("must be finite, got {}", strike),
        ))
    }
}

/// `1` on paths where `value > 0`, else `0`.
pub(crate) fn indicator(value: &PathValue) -> PathValue {
    value.map(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

/// Discounts `cashflow` paid at `date` with `market`'s curve.
pub(crate) fn discount(
    market: &dyn Market,
    date: SimDate,
    cashflow: PathValue,
) -> Result<PathValue, SimulationError> {
    Ok(cashflow.scale(market.discount_factor(date)?))
}

/// Position of `market` among `markets`, matched by name.
pub(crate) fn market_position(markets: &[Rc<dyn Market>], market: &dyn Market) -> Option<usize> {
    markets.iter().position(|m| m.name() == market.name())
}

pub(crate) fn unknown_market(asset: &str, market: &dyn Market) -> SimulationError {
    SimulationError::UnknownMarket {
        asset: asset.to_string(),
        market: market.name().to_string(),
    }
}
