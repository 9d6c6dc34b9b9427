//! Spread option between two markets.

use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, MemoCache};
use pricer_core::traits::{Asset, Market};
use pricer_core::types::{PathValue, SimDate, SimulationError};

use super::{
    discount, indicator, unknown_market, validate_strike, CASHFLOW, DISCOUNTED_CASHFLOW,
    EXERCISED, VOLUME,
};

const SPREAD: &str = "spread";

/// Call on `S_long - S_short` paying `max(S_long - S_short - K, 0)` at maturity.
///
/// On exercise the holder receives one unit of the long market and delivers
/// one unit of the short market.
pub struct SpreadOption {
    name: String,
    long: Rc<dyn Market>,
    short: Rc<dyn Market>,
    strike: f64,
    maturity: SimDate,
    cache: MemoCache<PathValue>,
}

impl SpreadOption {
    /// Creates a spread option.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] for a non-finite strike or when
    /// both legs are the same market.
    pub fn new(
        name: impl Into<String>,
        long: Rc<dyn Market>,
        short: Rc<dyn Market>,
        strike: f64,
        maturity: SimDate,
    ) -> Result<Self, SimulationError> {
        validate_strike(strike)?;
        if long.name() == short.name() {
            return Err(SimulationError::invalid_parameter(
                "short",
                format!("must differ from the long market '{}'", long.name()),
            ));
        }
        Ok(Self {
            name: name.into(),
            long,
            short,
            strike,
            maturity,
            cache: MemoCache::new(),
        })
    }

    /// Strike `K`.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Maturity `T`.
    pub fn maturity(&self) -> SimDate {
        self.maturity
    }

    fn spread(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(SPREAD), || {
            let long = self.long.spot(date)?;
            let short = self.short.spot(date)?;
            long.zip_with(&short, |a, b| a - b - self.strike)
        })
    }

    fn exercised(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(EXERCISED), || {
            Ok(indicator(&self.spread(date)?))
        })
    }
}

impl fmt::Debug for SpreadOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadOption")
            .field("name", &self.name)
            .field("long", &self.long.name())
            .field("short", &self.short.name())
            .field("strike", &self.strike)
            .field("maturity", &self.maturity)
            .finish()
    }
}

impl Asset for SpreadOption {
    fn name(&self) -> &str {
        &self.name
    }

    fn dates(&self) -> Vec<SimDate> {
        vec![self.maturity]
    }

    fn markets(&self) -> Vec<Rc<dyn Market>> {
        vec![Rc::clone(&self.long), Rc::clone(&self.short)]
    }

    fn cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(CASHFLOW), || {
            Ok(self.spread(date)?.map(|x| x.max(0.0)))
        })
    }

    fn discounted_cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(DISCOUNTED_CASHFLOW), || {
            discount(self.long.as_ref(), date, self.cashflow(date)?)
        })
    }

    fn volume(&self, date: SimDate, market: &dyn Market) -> Result<PathValue, SimulationError> {
        let sign = if market.name() == self.long.name() {
            1.0
        } else if market.name() == self.short.name() {
            -1.0
        } else {
            return Err(unknown_market(&self.name, market));
        };
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        let key = CacheKey::new(VOLUME, vec![market.name().into()]);
        self.cache
            .memoize(date, key, || Ok(self.exercised(date)?.scale(sign)))
    }
}
