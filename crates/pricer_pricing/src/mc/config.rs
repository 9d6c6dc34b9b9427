//! Monte Carlo engine configuration.
//!
//! [`EngineConfig`] gathers the ensemble-wide parameters of a run (path
//! count, seed, sampling strategy and confidence level) and builds the
//! [`NoiseGenerator`] shared by the markets.

use pricer_core::math::CorrelationMatrix;
use pricer_core::types::SimulationError;
use tracing::info;

use super::aggregate::DEFAULT_CONFIDENCE;
use crate::rng::{NoiseGenerator, SamplingKind};

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Monte Carlo engine configuration.
///
/// Immutable once built. Use [`EngineConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::EngineConfig;
/// use pricer_pricing::rng::SamplingKind;
///
/// let config = EngineConfig::builder()
///     .n_sims(10_000)
///     .sampling(SamplingKind::Antithetic)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_sims(), 10_000);
/// assert_eq!(config.confidence(), 0.95);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    n_sims: usize,
    seed: u64,
    sampling: SamplingKind,
    confidence: f64,
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Number of simulated paths.
    #[inline]
    pub fn n_sims(&self) -> usize {
        self.n_sims
    }

    /// Seed of the pseudo-random strategies.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sampling strategy.
    #[inline]
    pub fn sampling(&self) -> SamplingKind {
        self.sampling
    }

    /// Confidence level of the reported intervals.
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidParameter`] if `n_sims` is 0 or greater
    ///   than [`MAX_PATHS`], or `confidence` is outside (0, 1)
    /// - [`SimulationError::OddPathCount`] for antithetic sampling with an
    ///   odd path count
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.n_sims == 0 || self.n_sims > MAX_PATHS {
            return Err(SimulationError::invalid_parameter(
                "n_sims",
                format!("{} is outside [1, {}]", self.n_sims, MAX_PATHS),
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(SimulationError::invalid_parameter(
                "confidence",
                format!("{} is outside (0, 1)", self.confidence),
            ));
        }
        if self.sampling == SamplingKind::Antithetic && self.n_sims % 2 != 0 {
            return Err(SimulationError::OddPathCount(self.n_sims));
        }
        Ok(())
    }

    /// Builds the noise generator of a run over `noise_ids`.
    ///
    /// # Errors
    ///
    /// Configuration errors of [`EngineConfig::validate`] and
    /// [`NoiseGenerator::new`].
    pub fn build_generator<I, T>(
        &self,
        correlation: CorrelationMatrix,
        noise_ids: I,
    ) -> Result<NoiseGenerator, SimulationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.validate()?;
        let generator = NoiseGenerator::new(
            self.n_sims,
            correlation,
            noise_ids,
            self.sampling.build(self.seed),
        )?;
        info!(
            n_sims = self.n_sims,
            seed = self.seed,
            sampling = %self.sampling,
            n_noises = generator.correlation().dim(),
            "noise generator ready"
        );
        Ok(generator)
    }
}

/// Builder for [`EngineConfig`].
///
/// `n_sims` is required; the seed defaults to 0, the sampling strategy to
/// [`SamplingKind::Independent`] and the confidence level to
/// [`DEFAULT_CONFIDENCE`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    n_sims: Option<usize>,
    seed: Option<u64>,
    sampling: SamplingKind,
    confidence: Option<f64>,
}

impl EngineConfigBuilder {
    /// Sets the number of simulated paths, in [1, 10_000_000].
    #[inline]
    pub fn n_sims(mut self, n_sims: usize) -> Self {
        self.n_sims = Some(n_sims);
        self
    }

    /// Sets the seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the sampling strategy.
    #[inline]
    pub fn sampling(mut self, sampling: SamplingKind) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets the confidence level, in (0, 1).
    #[inline]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] if `n_sims` was not set, plus
    /// every error of [`EngineConfig::validate`].
    pub fn build(self) -> Result<EngineConfig, SimulationError> {
        let n_sims = self
            .n_sims
            .ok_or_else(|| SimulationError::invalid_parameter("n_sims", "must be specified"))?;

        let config = EngineConfig {
            n_sims,
            seed: self.seed.unwrap_or(0),
            sampling: self.sampling,
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::SimDate;

    #[test]
    fn test_config_builder_defaults() {
        let config = EngineConfig::builder().n_sims(10_000).build().unwrap();

        assert_eq!(config.n_sims(), 10_000);
        assert_eq!(config.seed(), 0);
        assert_eq!(config.sampling(), SamplingKind::Independent);
        assert_eq!(config.confidence(), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_config_invalid_zero_paths() {
        let result = EngineConfig::builder().n_sims(0).build();

        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter { name: "n_sims", .. })
        ));
    }

    #[test]
    fn test_config_invalid_too_many_paths() {
        let result = EngineConfig::builder().n_sims(MAX_PATHS + 1).build();

        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter { name: "n_sims", .. })
        ));
    }

    #[test]
    fn test_config_missing_paths() {
        let result = EngineConfig::builder().seed(1).build();

        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter { name: "n_sims", .. })
        ));
    }

    #[test]
    fn test_config_invalid_confidence() {
        for confidence in [0.0, 1.0, -0.5, f64::NAN] {
            let result = EngineConfig::builder()
                .n_sims(100)
                .confidence(confidence)
                .build();
            assert!(matches!(
                result,
                Err(SimulationError::InvalidParameter { name: "confidence", .. })
            ));
        }
    }

    #[test]
    fn test_config_antithetic_needs_even_paths() {
        let result = EngineConfig::builder()
            .n_sims(101)
            .sampling(SamplingKind::Antithetic)
            .build();

        assert!(matches!(result, Err(SimulationError::OddPathCount(101))));
    }

    #[test]
    fn test_build_generator() {
        let config = EngineConfig::builder()
            .n_sims(64)
            .sampling(SamplingKind::Sobol)
            .build()
            .unwrap();
        let generator = config
            .build_generator(CorrelationMatrix::identity(2), ["a", "b"])
            .unwrap();

        assert_eq!(generator.sampler_name(), "sobol");
        let noise = generator.all_noises(SimDate::new(1.0).unwrap()).unwrap();
        assert_eq!((noise.rows(), noise.cols()), (2, 64));
    }
}
