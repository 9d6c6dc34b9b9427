//! Simulation time.
//!
//! Simulation dates are year fractions measured from the valuation origin
//! (`t = 0`). They are plain scalars, but every cache in the engine is keyed
//! by them, so [`SimDate`] gives them a total order and a hash.
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::SimDate;
//!
//! let half = SimDate::new(0.5).unwrap();
//! let one = SimDate::new(1.0).unwrap();
//!
//! assert!(half < one);
//! assert_eq!(one.years_since(half), 0.5);
//! assert!(SimDate::new(f64::NAN).is_err());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::SimulationError;

/// A simulation date expressed as a year fraction from the origin.
///
/// NaN and infinite values are rejected at construction, and `-0.0` is
/// normalised to `0.0`, which makes equality, ordering and hashing agree.
#[derive(Copy, Clone, Debug)]
pub struct SimDate(f64);

impl SimDate {
    /// The time origin, `t = 0`.
    pub const ORIGIN: SimDate = SimDate(0.0);

    /// Creates a date from a year fraction.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] if `years` is not finite.
    pub fn new(years: f64) -> Result<Self, SimulationError> {
        if !years.is_finite() {
            return Err(SimulationError::InvalidConfig(format!(
                "simulation date must be finite, got {}",
                years
            )));
        }
        // Adding +0.0 maps -0.0 onto +0.0 and leaves every other value unchanged.
        Ok(Self(years + 0.0))
    }

    /// Returns the year fraction.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns `self - earlier` in years (negative if `earlier` is later).
    #[inline]
    pub fn years_since(self, earlier: SimDate) -> f64 {
        self.0 - earlier.0
    }
}

impl Default for SimDate {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl PartialEq for SimDate {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SimDate {}

impl PartialOrd for SimDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for SimDate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for SimDate {
    type Error = SimulationError;

    fn try_from(years: f64) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
