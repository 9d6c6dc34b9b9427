//! Single-asset Black-Scholes market.

use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, KeyPart, MemoCache};
use pricer_core::traits::{Market, NoiseSource};
use pricer_core::types::{PathValue, SimDate, SimulationError};

use super::{
    advance, previous_state, validate_dynamics, DISCOUNT_FACTOR, DISCOUNT_FACTOR_BETWEEN,
    SIMULATE, SPOT,
};

/// Exponential-Brownian market with a flat continuously compounded rate.
///
/// The market draws its noise under its own name, so the noise source must
/// know an identifier equal to `name`.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use pricer_core::math::Matrix;
/// use pricer_core::traits::{Market, NoiseSource};
/// use pricer_core::types::{SimDate, SimulationError};
/// use pricer_models::models::BlackScholesMarket;
///
/// struct Zero(Vec<String>);
/// impl NoiseSource for Zero {
///     fn n_sims(&self) -> usize { 2 }
///     fn noise_ids(&self) -> &[String] { &self.0 }
///     fn noises(&self, _: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
///         Ok(Rc::new(Matrix::zeros(ids.len(), 2)))
///     }
/// }
///
/// let noise = Rc::new(Zero(vec!["EQ".to_string()]));
/// let market = BlackScholesMarket::new("EQ", 100.0, 0.0, 0.2, noise).unwrap();
/// let t = SimDate::new(1.0).unwrap();
///
/// // With z = 0 the spot only carries the -sigma^2/2 drift.
/// let spot = market.spot(t).unwrap();
/// assert!((spot.get(0) - 100.0 * (-0.02_f64).exp()).abs() < 1e-12);
/// assert_eq!(market.discount_factor(t).unwrap(), 1.0);
/// ```
pub struct BlackScholesMarket {
    name: String,
    initial_value: f64,
    rate: f64,
    sigma: f64,
    noise_ids: Vec<String>,
    noise: Rc<dyn NoiseSource>,
    cache: MemoCache<PathValue>,
}

impl BlackScholesMarket {
    /// Creates a market.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidParameter`] unless `initial_value > 0`,
    ///   `sigma >= 0` and `rate` is finite
    /// - [`SimulationError::UnknownNoise`] if `noise` has no identifier `name`
    pub fn new(
        name: impl Into<String>,
        initial_value: f64,
        rate: f64,
        sigma: f64,
        noise: Rc<dyn NoiseSource>,
    ) -> Result<Self, SimulationError> {
        let name = name.into();
        validate_dynamics(initial_value, rate, sigma)?;
        if !noise.noise_ids().iter().any(|id| *id == name) {
            return Err(SimulationError::UnknownNoise(name));
        }
        Ok(Self {
            noise_ids: vec![name.clone()],
            name,
            initial_value,
            rate,
            sigma,
            noise,
            cache: MemoCache::new(),
        })
    }

    /// Initial spot `S0`.
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// Flat continuously compounded rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Lognormal volatility.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl fmt::Debug for BlackScholesMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlackScholesMarket")
            .field("name", &self.name)
            .field("initial_value", &self.initial_value)
            .field("rate", &self.rate)
            .field("sigma", &self.sigma)
            .finish_non_exhaustive()
    }
}

impl Market for BlackScholesMarket {
    fn name(&self) -> &str {
        &self.name
    }

    fn dates(&self) -> Vec<SimDate> {
        Vec::new()
    }

    fn noise_ids(&self) -> Vec<String> {
        self.noise_ids.clone()
    }

    fn simulate(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(SIMULATE), || {
            let (previous, state) = previous_state(&self.cache, &[])?;
            if date < previous {
                return Err(SimulationError::BackwardSimulation {
                    requested: date,
                    previous,
                });
            }
            let dt = date.years_since(previous);
            if dt == 0.0 {
                return Ok(state);
            }
            let noise = self.noise.noises(date, &self.noise_ids)?;
            advance(&state, self.rate, self.sigma, dt, noise.row(0))
        })
    }

    fn spot(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.cache.memoize(date, CacheKey::op(SPOT), || {
            Ok(self.simulate(date)?.scale(self.initial_value))
        })
    }

    fn discount_factor(&self, date: SimDate) -> Result<f64, SimulationError> {
        self.cache
            .memoize(date, CacheKey::op(DISCOUNT_FACTOR), || {
                Ok::<_, SimulationError>(PathValue::Constant((-self.rate * date.value()).exp()))
            })
            .map(|df| df.mean())
    }

    fn discount_factor_between(
        &self,
        date: SimDate,
        maturity: SimDate,
    ) -> Result<f64, SimulationError> {
        let key = CacheKey::new(
            DISCOUNT_FACTOR_BETWEEN,
            vec![KeyPart::scalar(maturity.value())],
        );
        self.cache
            .memoize(date, key, || {
                let tau = maturity.years_since(date);
                Ok::<_, SimulationError>(PathValue::Constant((-self.rate * tau).exp()))
            })
            .map(|df| df.mean())
    }

    fn forward(&self, _date: SimDate, _maturity: SimDate) -> Result<PathValue, SimulationError> {
        Err(SimulationError::NotImplemented(format!(
            "forward prices for market '{}'",
            self.name
        )))
    }
}
