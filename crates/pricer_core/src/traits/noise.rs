//! Noise source contract.

use std::rc::Rc;

use crate::math::Matrix;
use crate::types::{SimDate, SimulationError};

/// Provider of correlated standard normal draws.
///
/// For a given date, every call must return rows of the same underlying
/// draw: two markets asking for their own identifiers at the same date see
/// correlated noise, not independent redraws.
pub trait NoiseSource {
    /// Number of simulated paths (columns of every returned matrix).
    fn n_sims(&self) -> usize;

    /// Identifiers known to this source, in row order.
    fn noise_ids(&self) -> &[String];

    /// `ids.len() × n_sims` matrix of draws for `date`, rows in `ids` order.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownNoise`] if an identifier is not known.
    fn noises(&self, date: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError>;
}
