//! European call option.

use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, MemoCache};
use pricer_core::traits::{Asset, Market};
use pricer_core::types::{PathValue, SimDate, SimulationError};

use super::{
    discount, indicator, unknown_market, validate_strike, CASHFLOW, DISCOUNTED_CASHFLOW,
    EXERCISED, VOLUME,
};

/// European call paying `max(S_T - K, 0)` at maturity `T`.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use pricer_core::math::Matrix;
/// use pricer_core::traits::{Asset, Market, NoiseSource};
/// use pricer_core::types::{SimDate, SimulationError};
/// use pricer_models::instruments::EuropeanCall;
/// use pricer_models::models::BlackScholesMarket;
///
/// struct Zero(Vec<String>);
/// impl NoiseSource for Zero {
///     fn n_sims(&self) -> usize { 1 }
///     fn noise_ids(&self) -> &[String] { &self.0 }
///     fn noises(&self, _: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
///         Ok(Rc::new(Matrix::zeros(ids.len(), 1)))
///     }
/// }
///
/// let market: Rc<dyn Market> = Rc::new(
///     BlackScholesMarket::new("EQ", 100.0, 0.0, 0.0, Rc::new(Zero(vec!["EQ".into()]))).unwrap(),
/// );
/// let t = SimDate::new(1.0).unwrap();
/// let call = EuropeanCall::new("itm", Rc::clone(&market), 90.0, t).unwrap();
///
/// assert_eq!(call.cashflow(t).unwrap().get(0), 10.0);
/// assert_eq!(call.volume(t, market.as_ref()).unwrap().get(0), 1.0);
/// assert_eq!(call.cashflow(SimDate::new(0.5).unwrap()).unwrap().get(0), 0.0);
/// ```
pub struct EuropeanCall {
    name: String,
    market: Rc<dyn Market>,
    strike: f64,
    maturity: SimDate,
    cache: MemoCache<PathValue>,
}

impl EuropeanCall {
    /// Creates a call on `market`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] for a non-finite strike.
    pub fn new(
        name: impl Into<String>,
        market: Rc<dyn Market>,
        strike: f64,
        maturity: SimDate,
    ) -> Result<Self, SimulationError> {
        validate_strike(strike)?;
        Ok(Self {
            name: name.into(),
            market,
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

    /// Underlying market.
    pub fn market(&self) -> &Rc<dyn Market> {
        &self.market
    }

    fn exercised(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(EXERCISED), || {
            let spot = self.market.spot(date)?;
            Ok(indicator(&spot.map(|s| s - self.strike)))
        })
    }
}

impl fmt::Debug for EuropeanCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EuropeanCall")
            .field("name", &self.name)
            .field("market", &self.market.name())
            .field("strike", &self.strike)
            .field("maturity", &self.maturity)
            .finish()
    }
}

impl Asset for EuropeanCall {
    fn name(&self) -> &str {
        &self.name
    }

    fn dates(&self) -> Vec<SimDate> {
        vec![self.maturity]
    }

    fn markets(&self) -> Vec<Rc<dyn Market>> {
        vec![Rc::clone(&self.market)]
    }

    fn cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(CASHFLOW), || {
            let spot = self.market.spot(date)?;
            Ok(spot.map(|s| (s - self.strike).max(0.0)))
        })
    }

    fn discounted_cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        self.cache.memoize(date, CacheKey::op(DISCOUNTED_CASHFLOW), || {
            discount(self.market.as_ref(), date, self.cashflow(date)?)
        })
    }

    fn volume(&self, date: SimDate, market: &dyn Market) -> Result<PathValue, SimulationError> {
        if market.name() != self.market.name() {
            return Err(unknown_market(&self.name, market));
        }
        if date != self.maturity {
            return Ok(PathValue::ZERO);
        }
        let key = CacheKey::new(VOLUME, vec![market.name().into()]);
        self.cache.memoize(date, key, || self.exercised(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlackScholesMarket;
    use crate::test_support::{date, FixedNoise};
    use approx::assert_relative_eq;

    fn setup(z: Vec<f64>, rate: f64) -> (Rc<dyn Market>, Rc<FixedNoise>) {
        let noise = FixedNoise::new(&[("EQ", z), ("OTHER", vec![0.0])]);
        let market: Rc<dyn Market> =
            Rc::new(BlackScholesMarket::new("EQ", 100.0, rate, 0.2, noise.clone()).unwrap());
        (market, noise)
    }

    #[test]
    fn test_cashflow_at_maturity_only() {
        let (market, _) = setup(vec![1.0, -1.0], 0.0);
        let call = EuropeanCall::new("c", market.clone(), 100.0, date(1.0)).unwrap();

        assert_eq!(call.cashflow(date(0.5)).unwrap(), PathValue::ZERO);

        let spot = market.spot(date(1.0)).unwrap();
        let cf = call.cashflow(date(1.0)).unwrap();
        assert_relative_eq!(cf.get(0), spot.get(0) - 100.0, epsilon = 1e-12);
        assert_eq!(cf.get(1), 0.0);
    }

    #[test]
    fn test_discounted_cashflow_uses_market_curve() {
        let (market, _) = setup(vec![1.5], 0.05);
        let call = EuropeanCall::new("c", market.clone(), 90.0, date(2.0)).unwrap();

        let cf = call.cashflow(date(2.0)).unwrap().get(0);
        let dcf = call.discounted_cashflow(date(2.0)).unwrap().get(0);
        assert_relative_eq!(dcf, cf * (-0.1_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_volume_is_exercise_indicator() {
        let (market, _) = setup(vec![2.0, -2.0], 0.0);
        let call = EuropeanCall::new("c", market.clone(), 100.0, date(1.0)).unwrap();
        let v = call.volume(date(1.0), market.as_ref()).unwrap();
        assert_eq!(v.to_vec(2).unwrap(), vec![1.0, 0.0]);
        assert_eq!(call.volume(date(0.5), market.as_ref()).unwrap(), PathValue::ZERO);
    }

    #[test]
    fn test_volume_on_foreign_market_fails() {
        let (market, noise) = setup(vec![0.0], 0.0);
        let other = BlackScholesMarket::new("OTHER", 1.0, 0.0, 0.1, noise).unwrap();
        let call = EuropeanCall::new("c", market, 100.0, date(1.0)).unwrap();
        assert_eq!(
            call.volume(date(1.0), &other).unwrap_err(),
            SimulationError::UnknownMarket {
                asset: "c".to_string(),
                market: "OTHER".to_string()
            }
        );
    }

    #[test]
    fn test_payoff_memoized() {
        let (market, noise) = setup(vec![0.3], 0.0);
        let call = EuropeanCall::new("c", market, 100.0, date(1.0)).unwrap();
        call.discounted_cashflow(date(1.0)).unwrap();
        call.cashflow(date(1.0)).unwrap();
        call.discounted_cashflow(date(1.0)).unwrap();
        assert_eq!(noise.calls(), 1);
    }

    #[test]
    fn test_invalid_strike() {
        let (market, _) = setup(vec![0.0], 0.0);
        assert!(EuropeanCall::new("c", market, f64::INFINITY, date(1.0)).is_err());
    }
}
