//! Multi-asset Black-Scholes model with per-component market views.
//!
//! All components share one rate, one cache and one noise source. At each
//! date the model asks its noise source once for the draws of every
//! component, so the components move with the correlation of that source.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, KeyPart, MemoCache};
use pricer_core::traits::{Market, NoiseSource};
use pricer_core::types::{PathValue, SimDate, SimulationError};

use super::{
    advance, previous_state, validate_dynamics, DISCOUNT_FACTOR, DISCOUNT_FACTOR_BETWEEN,
    SIMULATE, SPOT,
};

/// Parameters of one basket component.
#[derive(Clone, Debug, PartialEq)]
pub struct BasketComponent {
    /// Noise identifier; also the suffix of the component market name
    pub noise_id: String,
    /// Initial spot
    pub initial_value: f64,
    /// Lognormal volatility
    pub sigma: f64,
}

impl BasketComponent {
    /// Creates component parameters.
    pub fn new(noise_id: impl Into<String>, initial_value: f64, sigma: f64) -> Self {
        Self {
            noise_id: noise_id.into(),
            initial_value,
            sigma,
        }
    }
}

struct BasketState {
    name: String,
    rate: f64,
    components: Vec<BasketComponent>,
    noise_ids: Vec<String>,
    noise: Rc<dyn NoiseSource>,
    cache: MemoCache<PathValue>,
}

impl BasketState {
    fn simulate(&self, index: usize, date: SimDate) -> Result<PathValue, SimulationError> {
        let args = vec![KeyPart::Index(index)];
        self.cache.memoize(date, CacheKey::new(SIMULATE, args.clone()), || {
            let (previous, state) = previous_state(&self.cache, &args)?;
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
            // One request for all components, served once per date by the source.
            let noise = self.noise.noises(date, &self.noise_ids)?;
            let sigma = self.components[index].sigma;
            advance(&state, self.rate, sigma, dt, noise.row(index))
        })
    }

    fn spot(&self, index: usize, date: SimDate) -> Result<PathValue, SimulationError> {
        let key = CacheKey::new(SPOT, vec![KeyPart::Index(index)]);
        self.cache.memoize(date, key, || {
            let initial_value = self.components[index].initial_value;
            Ok(self.simulate(index, date)?.scale(initial_value))
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
}

/// Correlated exponential-Brownian components with a shared rate.
///
/// Each component is exposed as a [`ComponentMarket`] named
/// `"{model}/{noise_id}"`; instruments are written on those views.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use pricer_core::math::Matrix;
/// use pricer_core::traits::{Market, NoiseSource};
/// use pricer_core::types::{SimDate, SimulationError};
/// use pricer_models::models::{BasketComponent, BlackScholesBasketModel};
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
/// let noise = Rc::new(Zero(vec!["A".into(), "B".into()]));
/// let model = BlackScholesBasketModel::new(
///     "basket",
///     0.0,
///     vec![BasketComponent::new("A", 100.0, 0.0), BasketComponent::new("B", 50.0, 0.0)],
///     noise,
/// )
/// .unwrap();
///
/// let b = model.component(1).unwrap();
/// assert_eq!(b.name(), "basket/B");
/// assert_eq!(b.spot(SimDate::new(1.0).unwrap()).unwrap().get(0), 50.0);
/// ```
pub struct BlackScholesBasketModel {
    state: Rc<BasketState>,
    views: Vec<Rc<ComponentMarket>>,
}

impl BlackScholesBasketModel {
    /// Creates the model and its component views.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfig`] without components or with
    ///   duplicate noise identifiers
    /// - [`SimulationError::InvalidParameter`] for an invalid rate, spot or
    ///   volatility
    /// - [`SimulationError::UnknownNoise`] if `noise` lacks an identifier
    pub fn new(
        name: impl Into<String>,
        rate: f64,
        components: Vec<BasketComponent>,
        noise: Rc<dyn NoiseSource>,
    ) -> Result<Self, SimulationError> {
        let name = name.into();
        if components.is_empty() {
            return Err(SimulationError::InvalidConfig(format!(
                "basket model '{}' needs at least one component",
                name
            )));
        }

        let mut seen = HashSet::new();
        for component in &components {
            validate_dynamics(component.initial_value, rate, component.sigma)?;
            if !seen.insert(component.noise_id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "basket model '{}' lists noise '{}' twice",
                    name, component.noise_id
                )));
            }
            if !noise.noise_ids().contains(&component.noise_id) {
                return Err(SimulationError::UnknownNoise(component.noise_id.clone()));
            }
        }

        let noise_ids = components.iter().map(|c| c.noise_id.clone()).collect();
        let state = Rc::new(BasketState {
            name,
            rate,
            components,
            noise_ids,
            noise,
            cache: MemoCache::new(),
        });
        let views = (0..state.components.len())
            .map(|index| {
                Rc::new(ComponentMarket {
                    name: format!("{}/{}", state.name, state.components[index].noise_id),
                    index,
                    state: Rc::clone(&state),
                })
            })
            .collect();

        Ok(Self { state, views })
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Shared rate.
    pub fn rate(&self) -> f64 {
        self.state.rate
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always `false`; construction requires one component.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// View on component `index`.
    pub fn component(&self, index: usize) -> Option<Rc<dyn Market>> {
        self.views
            .get(index)
            .map(|view| Rc::clone(view) as Rc<dyn Market>)
    }

    /// Views on all components, in construction order.
    pub fn components(&self) -> Vec<Rc<dyn Market>> {
        self.views
            .iter()
            .map(|view| Rc::clone(view) as Rc<dyn Market>)
            .collect()
    }

    /// Advances every component to `date`.
    pub fn simulate_all(&self, date: SimDate) -> Result<Vec<PathValue>, SimulationError> {
        (0..self.views.len())
            .map(|index| self.state.simulate(index, date))
            .collect()
    }
}

impl fmt::Debug for BlackScholesBasketModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlackScholesBasketModel")
            .field("name", &self.state.name)
            .field("rate", &self.state.rate)
            .field("components", &self.state.components)
            .finish_non_exhaustive()
    }
}

/// One component of a [`BlackScholesBasketModel`] seen as a [`Market`].
pub struct ComponentMarket {
    name: String,
    index: usize,
    state: Rc<BasketState>,
}

impl ComponentMarket {
    /// Position of the component in its model.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Initial spot of the component.
    pub fn initial_value(&self) -> f64 {
        self.state.components[self.index].initial_value
    }

    /// Volatility of the component.
    pub fn sigma(&self) -> f64 {
        self.state.components[self.index].sigma
    }
}

impl fmt::Debug for ComponentMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMarket")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Market for ComponentMarket {
    fn name(&self) -> &str {
        &self.name
    }

    fn dates(&self) -> Vec<SimDate> {
        Vec::new()
    }

    fn noise_ids(&self) -> Vec<String> {
        vec![self.state.components[self.index].noise_id.clone()]
    }

    fn simulate(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.state.simulate(self.index, date)
    }

    fn spot(&self, date: SimDate) -> Result<PathValue, SimulationError> {
        self.state.spot(self.index, date)
    }

    fn discount_factor(&self, date: SimDate) -> Result<f64, SimulationError> {
        self.state.discount_factor(date)
    }

    fn discount_factor_between(
        &self,
        date: SimDate,
        maturity: SimDate,
    ) -> Result<f64, SimulationError> {
        self.state.discount_factor_between(date, maturity)
    }

    fn forward(&self, _date: SimDate, _maturity: SimDate) -> Result<PathValue, SimulationError> {
        Err(SimulationError::NotImplemented(format!(
            "forward prices for market '{}'",
            self.name
        )))
    }
}
