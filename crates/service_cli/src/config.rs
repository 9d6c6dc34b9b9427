//! Run configuration loaded from a TOML file.
//!
//! ```toml
//! n_sims = 100000
//! seed = 7
//! sampling = "sobol"
//!
//! [[noises]]
//! ids = ["SPX", "SX5E"]
//! matrix = [1.0, 0.6, 0.6, 1.0]
//!
//! [[markets]]
//! name = "SPX"
//! initial_value = 100.0
//! rate = 0.01
//! sigma = 0.2
//!
//! [[assets]]
//! kind = "european_call"
//! name = "spx_atm"
//! market = "SPX"
//! strike = 100.0
//! maturity = 1.0
//! ```
//!
//! Each `[[noises]]` block is a correlated group of identifiers. Groups are
//! independent of each other and share one noise generator, whose matrix
//! holds the blocks along its diagonal. A market draws the noise of the same
//! name. `EFFICIENTMC_N_SIMS`,
//! `EFFICIENTMC_SEED` and `EFFICIENTMC_SAMPLING` override the file.

use std::collections::HashSet;
use std::path::Path;

use pricer_pricing::mc::{DEFAULT_CONFIDENCE, MAX_PATHS};
use pricer_pricing::rng::SamplingKind;
use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file '{path}': {message}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O message.
        message: String,
    },

    /// The file is not valid TOML for a run.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// One or more values are invalid.
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

/// A complete run: engine settings, noise blocks, markets and assets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of simulated paths.
    pub n_sims: usize,

    /// Seed of the pseudo-random samplers.
    #[serde(default)]
    pub seed: u64,

    /// Confidence level of the reported intervals.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Sampling strategy.
    #[serde(default)]
    pub sampling: SamplingKind,

    /// Correlated noise blocks.
    #[serde(default)]
    pub noises: Vec<NoiseConfig>,

    /// Black-Scholes markets.
    #[serde(default)]
    pub markets: Vec<MarketConfig>,

    /// Instruments to price.
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

/// One correlated block of noise identifiers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    /// Noise identifiers, in matrix order.
    pub ids: Vec<String>,

    /// Row-major correlation matrix; identity when omitted.
    #[serde(default)]
    pub matrix: Option<Vec<f64>>,
}

impl NoiseConfig {
    /// Correlation entries, filling in the identity when no matrix is given.
    pub fn matrix_or_identity(&self) -> Vec<f64> {
        match &self.matrix {
            Some(matrix) => matrix.clone(),
            None => {
                let dim = self.ids.len();
                (0..dim * dim)
                    .map(|k| if k / dim == k % dim { 1.0 } else { 0.0 })
                    .collect()
            }
        }
    }
}

/// A Black-Scholes market driven by the noise of the same name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketConfig {
    /// Market and noise identifier.
    pub name: String,
    /// Spot at the origin.
    pub initial_value: f64,
    /// Continuously compounded rate.
    pub rate: f64,
    /// Volatility.
    pub sigma: f64,
}

/// An instrument, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetConfig {
    /// Call on one market.
    EuropeanCall {
        /// Asset name.
        name: String,
        /// Underlying market.
        market: String,
        /// Strike.
        strike: f64,
        /// Maturity in years.
        maturity: f64,
    },
    /// Call on `long - short`.
    Spread {
        /// Asset name.
        name: String,
        /// Long leg.
        long: String,
        /// Short leg.
        short: String,
        /// Strike.
        strike: f64,
        /// Maturity in years.
        maturity: f64,
    },
    /// Call on a weighted sum of markets.
    Basket {
        /// Asset name.
        name: String,
        /// Component markets.
        markets: Vec<String>,
        /// Weights, one per market.
        weights: Vec<f64>,
        /// Strike.
        strike: f64,
        /// Maturity in years.
        maturity: f64,
    },
}

impl AssetConfig {
    /// Asset name.
    pub fn name(&self) -> &str {
        match self {
            Self::EuropeanCall { name, .. } | Self::Spread { name, .. } | Self::Basket { name, .. } => {
                name
            }
        }
    }

    /// Maturity in years.
    pub fn maturity(&self) -> f64 {
        match self {
            Self::EuropeanCall { maturity, .. }
            | Self::Spread { maturity, .. }
            | Self::Basket { maturity, .. } => *maturity,
        }
    }

    /// Markets the asset references.
    pub fn market_names(&self) -> Vec<&str> {
        match self {
            Self::EuropeanCall { market, .. } => vec![market.as_str()],
            Self::Spread { long, short, .. } => vec![long.as_str(), short.as_str()],
            Self::Basket { markets, .. } => markets.iter().map(String::as_str).collect(),
        }
    }
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl RunConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `EFFICIENTMC_*` environment overrides.
    ///
    /// Unparsable values are reported rather than ignored.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        if let Ok(value) = std::env::var("EFFICIENTMC_N_SIMS") {
            match value.parse() {
                Ok(n_sims) => self.n_sims = n_sims,
                Err(_) => errors.push(format!("EFFICIENTMC_N_SIMS is not a path count: '{}'", value)),
            }
        }
        if let Ok(value) = std::env::var("EFFICIENTMC_SEED") {
            match value.parse() {
                Ok(seed) => self.seed = seed,
                Err(_) => errors.push(format!("EFFICIENTMC_SEED is not a seed: '{}'", value)),
            }
        }
        if let Ok(value) = std::env::var("EFFICIENTMC_SAMPLING") {
            match value.parse() {
                Ok(sampling) => self.sampling = sampling,
                Err(e) => errors.push(format!("EFFICIENTMC_SAMPLING: {}", e)),
            }
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Checks every value, collecting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.n_sims == 0 || self.n_sims > MAX_PATHS {
            errors.push(format!("n_sims must be between 1 and {}", MAX_PATHS));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            errors.push("confidence must be strictly between 0 and 1".to_string());
        }
        if self.sampling == SamplingKind::Antithetic && self.n_sims % 2 != 0 {
            errors.push("n_sims must be even with antithetic sampling".to_string());
        }

        let mut noise_ids = HashSet::new();
        for (index, block) in self.noises.iter().enumerate() {
            if block.ids.is_empty() {
                errors.push(format!("noises[{}] has no ids", index));
            }
            for id in &block.ids {
                if !noise_ids.insert(id.as_str()) {
                    errors.push(format!("noise id '{}' is listed more than once", id));
                }
            }
            if let Some(matrix) = &block.matrix {
                let expected = block.ids.len() * block.ids.len();
                if matrix.len() != expected {
                    errors.push(format!(
                        "noises[{}].matrix has {} entries, expected {}",
                        index,
                        matrix.len(),
                        expected
                    ));
                }
            }
        }

        let mut market_names = HashSet::new();
        for market in &self.markets {
            if !market_names.insert(market.name.as_str()) {
                errors.push(format!("market '{}' is defined more than once", market.name));
            }
            if !noise_ids.contains(market.name.as_str()) {
                errors.push(format!("market '{}' has no noise block", market.name));
            }
        }

        if self.assets.is_empty() {
            errors.push("at least one asset is required".to_string());
        }
        let mut asset_names = HashSet::new();
        for asset in &self.assets {
            if !asset_names.insert(asset.name()) {
                errors.push(format!("asset '{}' is defined more than once", asset.name()));
            }
            if !(asset.maturity().is_finite() && asset.maturity() >= 0.0) {
                errors.push(format!("asset '{}' has an invalid maturity", asset.name()));
            }
            for market in asset.market_names() {
                if !market_names.contains(market) {
                    errors.push(format!(
                        "asset '{}' references unknown market '{}'",
                        asset.name(),
                        market
                    ));
                }
            }
            if let AssetConfig::Basket { name, markets, weights, .. } = asset {
                if markets.len() != weights.len() {
                    errors.push(format!(
                        "basket '{}' has {} markets but {} weights",
                        name,
                        markets.len(),
                        weights.len()
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Loads, applies environment overrides and validates.
    pub fn load_with_env_and_validate(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load(path)?.with_env_override()?;
        config.validate()?;
        Ok(config)
    }
}
