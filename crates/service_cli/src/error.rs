//! Error types of the command line front end.

use pricer_core::types::SimulationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the `efficientmc` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read, parsed or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command-line argument has an unsupported value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine rejected the run.
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    /// JSON rendering failed.
    #[error("Output serialisation failed: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result alias of the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_error_converts() {
        let err: CliError = SimulationError::EmptyPortfolio.into();
        assert!(err.to_string().starts_with("Simulation failed"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: CliError = ConfigError::Validation(vec!["n_sims must be positive".into()]).into();
        assert!(err.to_string().contains("n_sims must be positive"));
    }
}
