//! Error types for structured error handling.
//!
//! This module provides [`SimulationError`], the error returned by every
//! public contract of the engine (markets, assets, noise sources, samplers
//! and the orchestrator). Lower-level errors from the cache and from
//! correlation validation convert into it via `From`.
//!
//! Every variant belongs to one [`ErrorKind`], which lets callers react to
//! the class of failure without matching on individual variants.

use thiserror::Error;

use super::time::SimDate;
use crate::cache::CacheError;
use crate::math::correlation::CorrelationError;

/// Broad failure classes of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid construction parameters; raised before any simulation starts.
    Configuration,
    /// The requested operation is structurally unsupported.
    NotImplemented,
    /// A cache was used inconsistently with its single-date invariant.
    State,
    /// A requested identifier or cached entry does not exist.
    Lookup,
}

/// Errors raised while configuring or running a simulation.
///
/// # Examples
/// ```
/// use pricer_core::types::SimulationError;
/// use pricer_core::types::error::ErrorKind;
///
/// let err = SimulationError::OddPathCount(3);
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(err.to_string().contains("even"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Generic configuration problem.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A model or instrument parameter is out of its valid domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The correlation matrix failed validation or Cholesky factorisation.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// Antithetic sampling was asked for an odd number of paths.
    #[error("Antithetic sampling requires an even number of paths, got {0}")]
    OddPathCount(usize),

    /// A low-discrepancy sequence cannot provide that many dimensions.
    #[error("{strategy} supports at most {max} dimensions, {requested} requested")]
    DimensionLimit {
        /// Sampling strategy name
        strategy: &'static str,
        /// Requested number of dimensions
        requested: usize,
        /// Largest supported number of dimensions
        max: usize,
    },

    /// A date earlier than the last simulated one was requested.
    #[error(
        "Brownian bridge not implemented: cannot simulate {requested} after {previous}"
    )]
    BackwardSimulation {
        /// Date that was requested
        requested: SimDate,
        /// Last date simulated by the object
        previous: SimDate,
    },

    /// Operation not available for this model or instrument.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A noise identifier unknown to the generator was requested.
    #[error("Unknown noise identifier '{0}'")]
    UnknownNoise(String),

    /// An asset was queried for a market it is not exposed to.
    #[error("Asset '{asset}' is not exposed to market '{market}'")]
    UnknownMarket {
        /// Asset name
        asset: String,
        /// Market name
        market: String,
    },

    /// Two distinct market objects were registered under one name.
    #[error("Two distinct markets share the name '{0}'")]
    DuplicateMarket(String),

    /// The orchestrator was called without assets.
    #[error("Monte Carlo run requires at least one asset")]
    EmptyPortfolio,

    /// Path vectors or matrices of incompatible sizes were combined.
    #[error("Shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Date cache invariant violation or missing entry.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl SimulationError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_)
            | Self::InvalidParameter { .. }
            | Self::Correlation(_)
            | Self::OddPathCount(_)
            | Self::DimensionLimit { .. }
            | Self::DuplicateMarket(_)
            | Self::EmptyPortfolio
            | Self::ShapeMismatch { .. } => ErrorKind::Configuration,
            Self::BackwardSimulation { .. } | Self::NotImplemented(_) => {
                ErrorKind::NotImplemented
            }
            Self::UnknownNoise(_) | Self::UnknownMarket { .. } => ErrorKind::Lookup,
            Self::Cache(err) => match err {
                CacheError::DateMismatch { .. } => ErrorKind::State,
                CacheError::MissingKey(_) | CacheError::NoHistory(_) => ErrorKind::Lookup,
            },
        }
    }

    /// Creates an [`SimulationError::InvalidParameter`] error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_simulation_display() {
        let err = SimulationError::BackwardSimulation {
            requested: SimDate::new(0.5).unwrap(),
            previous: SimDate::new(1.0).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Brownian bridge not implemented: cannot simulate t=0.5 after t=1"
        );
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_cache_errors_map_to_state_and_lookup() {
        let mismatch: SimulationError = CacheError::DateMismatch {
            active: SimDate::new(1.0).unwrap(),
            requested: SimDate::new(2.0).unwrap(),
        }
        .into();
        assert_eq!(mismatch.kind(), ErrorKind::State);

        let missing: SimulationError = CacheError::MissingKey("spot()".to_string()).into();
        assert_eq!(missing.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_correlation_error_is_configuration() {
        let err: SimulationError = CorrelationError::NotPositiveDefinite.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("positive definite"));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = SimulationError::invalid_parameter("sigma", "must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'sigma': must be non-negative"
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = SimulationError::EmptyPortfolio;
        let _: &dyn std::error::Error = &err;
    }
}
