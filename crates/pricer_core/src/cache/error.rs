//! Cache error types.

use thiserror::Error;

use crate::types::SimDate;

/// Errors raised by [`DateCache`](super::DateCache).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    /// A value was registered for a date other than the active one.
    #[error("Cache holds values for {active}, cannot register values for {requested} without a flush")]
    DateMismatch {
        /// Date currently held by the cache
        active: SimDate,
        /// Date of the rejected registration
        requested: SimDate,
    },

    /// The key has no value for the active date.
    #[error("No cached value for {0}")]
    MissingKey(String),

    /// The key was never committed to the history.
    #[error("No previous value for {0}")]
    NoHistory(String),
}
