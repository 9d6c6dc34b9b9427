//! Per-path quantities of the simulation ensemble.
//!
//! Every date-dependent quantity in the engine is conceptually a vector of
//! length `n_sims`. Deterministic quantities (a discount factor, a zero
//! cash-flow before maturity) are kept as a single broadcast constant instead
//! of being materialised once per path.

use std::rc::Rc;

use super::error::SimulationError;

/// A value per simulated path, or a constant broadcast to every path.
///
/// Path vectors are reference counted so that cached values can be handed
/// out to several consumers without copying the ensemble.
///
/// # Examples
///
/// ```
/// use pricer_core::types::PathValue;
///
/// let spots = PathValue::from_vec(vec![90.0, 100.0, 120.0]);
/// let payoff = spots.map(|s| (s - 100.0).max(0.0));
/// assert_eq!(payoff.to_vec(3).unwrap(), vec![0.0, 0.0, 20.0]);
///
/// let df = PathValue::Constant(0.5);
/// let discounted = payoff.zip_with(&df, |p, d| p * d).unwrap();
/// assert_eq!(discounted.get(2), 10.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PathValue {
    /// The same value on every path.
    Constant(f64),
    /// One value per path.
    Paths(Rc<[f64]>),
}

impl PathValue {
    /// A zero constant.
    pub const ZERO: PathValue = PathValue::Constant(0.0);

    /// Wraps a per-path vector.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::Paths(values.into())
    }

    /// Returns `true` for a broadcast constant.
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Number of explicit paths, `None` for a constant.
    #[inline]
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::Paths(values) => Some(values.len()),
        }
    }

    /// Value on path `index`; constants return their value for every index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds of a path vector.
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Paths(values) => values[index],
        }
    }

    /// Applies `f` to every path.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(f(*value)),
            Self::Paths(values) => Self::Paths(values.iter().map(|&v| f(v)).collect()),
        }
    }

    /// Combines two values path by path, broadcasting constants.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ShapeMismatch`] if both operands are path
    /// vectors of different lengths.
    pub fn zip_with(
        &self,
        other: &PathValue,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, SimulationError> {
        let combined = match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => Self::Constant(f(*a, *b)),
            (Self::Constant(a), Self::Paths(b)) => Self::Paths(b.iter().map(|&y| f(*a, y)).collect()),
            (Self::Paths(a), Self::Constant(b)) => Self::Paths(a.iter().map(|&x| f(x, *b)).collect()),
            (Self::Paths(a), Self::Paths(b)) => {
                if a.len() != b.len() {
                    return Err(SimulationError::ShapeMismatch {
                        expected: a.len(),
                        got: b.len(),
                    });
                }
                Self::Paths(a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect())
            }
        };
        Ok(combined)
    }

    /// Multiplies every path by `factor`.
    #[inline]
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Arithmetic mean across paths.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Paths(values) if values.is_empty() => 0.0,
            Self::Paths(values) => values.iter().sum::<f64>() / values.len() as f64,
        }
    }

    /// Materialises the value as exactly `n_sims` entries.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ShapeMismatch`] if a path vector does not
    /// have `n_sims` entries.
    pub fn to_vec(&self, n_sims: usize) -> Result<Vec<f64>, SimulationError> {
        match self {
            Self::Constant(value) => Ok(vec![*value; n_sims]),
            Self::Paths(values) if values.len() == n_sims => Ok(values.to_vec()),
            Self::Paths(values) => Err(SimulationError::ShapeMismatch {
                expected: n_sims,
                got: values.len(),
            }),
        }
    }
}

impl Default for PathValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for PathValue {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Vec<f64>> for PathValue {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}
