//! Basket call option.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, MemoCache};
use pricer_core::traits::{Asset, Market};
use pricer_core::types::{PathValue, SimDate, SimulationError};

use super::{
    discount, indicator, market_position, unknown_market, validate_strike, CASHFLOW,
    DISCOUNTED_CASHFLOW, EXERCISED, VOLUME,
};

const BASKET: &str = "basket";

/// Call on `Σ wᵢ Sᵢ` paying `max(Σ wᵢ Sᵢ - K, 0)` at maturity.
///
/// On exercise the holder receives `wᵢ` units of market `i`.
pub struct BasketCall {
    name: String,
    markets: Vec<Rc<dyn Market>>,
    weights: Vec<f64>,
    strike: f64,
    maturity: SimDate,
    cache: MemoCache<PathValue>,
}

impl BasketCall {
    /// Creates a basket call.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfig`] without markets, with a weight
    ///   count different from the market count, or with a market listed twice
    /// - [`SimulationError::InvalidParameter`] for a non-finite strike or weight
    pub fn new(
        name: impl Into<String>,
        markets: Vec<Rc<dyn Market>>,
        weights: Vec<f64>,
        strike: f64,
        maturity: SimDate,
    ) -> Result<Self, SimulationError> {
        let name = name.into();
        validate_strike(strike)?;
        if markets.is_empty() {
            return Err(SimulationError::InvalidConfig(format!(
                "basket '{}' needs at least one market",
                name
            )));
        }
        if markets.len() != weights.len() {
            return Err(SimulationError::InvalidConfig(format!(
                "basket '{}' has {} markets but {} weights",
                name,
                markets.len(),
                weights.len()
            )));
        }
        if let Some(weight) = weights.iter().find(|w| !w.is_finite()) {
            return Err(SimulationError::invalid_parameter(
                "weights",
                format!("must be finite, got {}", weight),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = markets.iter().find(|m| !seen.insert(m.name().to_string())) {
            return Err(SimulationError::InvalidConfig(format!(
                "basket '{}' lists market '{}' twice",
                name,
                dup.name()
            )));
        }

        Ok(Self {
            name,
            markets,
            weights,
            strike,
            maturity,
            cache: MemoCache::new(),
        })
    }

    /// Basket weights, in market order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Strike `K`.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Maturity `T`.
    pub fn maturity(&self) -> SimDate {
        self.maturity
    }

    fn basket(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(BASKET), || {
            let mut total = PathValue::ZERO;
            for (market, &weight) in self.markets.iter().zip(&self.weights) {
                let spot = market.spot(date)?;
                total = total.zip_with(&spot, |acc, s| acc + weight * s)?;
            }
            Ok(total)
        })
    }

    fn exercised(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(EXERCISED), || {
            Ok(indicator(&self.basket(date)?.map(|b| b - self.strike)))
        })
    }
}

impl fmt::Debug for BasketCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let markets: Vec<&str> = self.markets.iter().map(|m| m.name()).collect();
        f.debug_struct("BasketCall")
            .field("name", &self.name)
            .field("markets", &markets)
            .field("weights", &self.weights)
            .field("strike", &self.strike)
            .field("maturity", &self.maturity)
            .finish()
    }
}

impl Asset for BasketCall {
    fn name(&self) -> &str {
        &self.name
    }

    fn dates(&self) -> Vec<SimDate> {
        vec![self.maturity]
    }

    fn markets(&self) -> Vec<Rc<dyn Market>> {
        self.markets.clone()
    }

    fn cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(CASHFLOW), || {
            Ok(self.basket(date)?.map(|b| (b - self.strike).max(0.0)))
        })
    }

    fn discounted_cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(DISCOUNTED_CASHFLOW), || {
            discount(self.markets[0].as_ref(), date, self.cashflow(date)?)
        })
    }

    fn volume(&self, date: SimDate, market: &dyn Market) -> Result<PathValue, SimulationError> {
        let position = market_position(&self.markets, market)
            .ok_or_else(|| unknown_market(&self.name, market))?;
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        let weight = self.weights[position];
        let key = CacheKey::new(VOLUME, vec![market.name().into()]);
        self.cache
            .memoize(date, key, || Ok(self.exercised(date)?.scale(weight)))
    }
}
