//! Asset contract.

use std::rc::Rc;

use super::market::Market;
use crate::types::{PathValue, SimDate, SimulationError};

/// A priced instrument written on one or more markets.
pub trait Asset {
    /// Unique name of the asset within a run.
    fn name(&self) -> &str;

    /// Dates at which the asset observes its markets (e.g. its maturity).
    fn dates(&self) -> Vec<SimDate>;

    /// Markets the asset depends on, in the order of its parameters.
    fn markets(&self) -> Vec<Rc<dyn Market>>;

    /// Undiscounted cash-flow paid at `date` (zero on other dates).
    fn cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError>;

    /// Cash-flow at `date` discounted to the origin.
    fn discounted_cashflow(&self, date: SimDate) -> Result<PathValue, SimulationError>;

    /// Quantity of `market` exercised at `date`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownMarket`] if the asset is not written on `market`.
    fn volume(&self, date: SimDate, market: &dyn Market) -> Result<PathValue, SimulationError>;
}
