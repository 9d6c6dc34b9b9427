//! Market contract.

use crate::types::{PathValue, SimDate, SimulationError};

/// A simulated market: a stochastic price process plus its discount curve.
///
/// `simulate` advances the market's internal state to `date` and must be
/// called with non-decreasing dates. Repeated calls at the same date return
/// the cached state.
pub trait Market {
    /// Unique name of the market within a run.
    fn name(&self) -> &str;

    /// Dates the market itself needs simulated, if any.
    fn dates(&self) -> Vec<SimDate>;

    /// Noise identifiers consumed by this market.
    fn noise_ids(&self) -> Vec<String>;

    /// Normalised state of the process at `date` (1 at the origin).
    ///
    /// # Errors
    ///
    /// [`SimulationError::BackwardSimulation`] if `date` precedes the last
    /// simulated date.
    fn simulate(&self, date: SimDate) -> Result<PathValue, SimulationError>;

    /// Simulated price at `date`.
    fn spot(&self, date: SimDate) -> Result<PathValue, SimulationError>;

    /// Discount factor from the origin to `date`.
    fn discount_factor(&self, date: SimDate) -> Result<f64, SimulationError>;

    /// Discount factor from `date` to `maturity`.
    fn discount_factor_between(
        &self,
        date: SimDate,
        maturity: SimDate,
    ) -> Result<f64, SimulationError>;

    /// Forward price seen at `date` for `maturity`.
    fn forward(&self, date: SimDate, maturity: SimDate) -> Result<PathValue, SimulationError>;
}
