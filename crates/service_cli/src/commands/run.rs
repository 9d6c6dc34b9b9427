//! `efficientmc run`: prices the portfolio described by a config file.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use pricer_core::math::CorrelationMatrix;
use pricer_core::traits::{Asset, Market, NoiseSource};
use pricer_core::types::{SimDate, SimulationError};
use pricer_models::instruments::{BasketCall, EuropeanCall, SpreadOption};
use pricer_models::models::BlackScholesMarket;
use pricer_pricing::mc::{run_mc, EngineConfig};
use pricer_pricing::rng::{NoiseGenerator, SamplingKind};
use tracing::info;

use super::report::{OutputFormat, PricingReport};
use crate::config::{AssetConfig, RunConfig};
use crate::Result;

/// Command-line values taking precedence over the file and the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    /// Sampling strategy.
    pub sampling: Option<SamplingKind>,
    /// Number of paths.
    pub n_sims: Option<usize>,
    /// Seed.
    pub seed: Option<u64>,
}

impl RunOverrides {
    fn apply(self, config: &mut RunConfig) {
        if let Some(sampling) = self.sampling {
            config.sampling = sampling;
        }
        if let Some(n_sims) = self.n_sims {
            config.n_sims = n_sims;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

/// Loads `config_path`, prices it and prints the report.
pub fn run(config_path: &str, overrides: RunOverrides, format: &str) -> Result<()> {
    let format: OutputFormat = format.parse()?;

    info!("Loading run configuration from {}", config_path);
    let mut config = RunConfig::load(config_path)?.with_env_override()?;
    overrides.apply(&mut config);
    config.validate()?;

    let report = price(&config)?;
    println!("{}", report.render(format)?);
    Ok(())
}

/// Simulates a validated configuration.
pub fn price(config: &RunConfig) -> Result<PricingReport> {
    let assets = build_portfolio(config)?;
    let output = run_mc(&assets)?;
    info!(
        n_assets = assets.len(),
        n_dates = output.dates().len(),
        "portfolio simulated"
    );
    PricingReport::from_output(&output, config.sampling, config.confidence)
}

/// Builds one noise generator covering every `[[noises]]` block.
///
/// Blocks are independent of each other: their matrices are laid out along
/// the diagonal of one correlation matrix. Sharing a generator keeps the
/// blocks on distinct quasi-random dimensions, which separately built
/// generators would not be.
pub fn build_generator(config: &RunConfig) -> std::result::Result<NoiseGenerator, SimulationError> {
    let ids: Vec<String> = config
        .noises
        .iter()
        .flat_map(|block| block.ids.iter().cloned())
        .collect();
    let dim = ids.len();
    let mut matrix = vec![0.0; dim * dim];
    let mut offset = 0;
    for block in &config.noises {
        let width = block.ids.len();
        let entries = block.matrix_or_identity();
        if entries.len() != width * width {
            return Err(SimulationError::ShapeMismatch {
                expected: width * width,
                got: entries.len(),
            });
        }
        for (k, value) in entries.into_iter().enumerate() {
            matrix[(offset + k / width) * dim + offset + k % width] = value;
        }
        offset += width;
    }

    let engine = EngineConfig::builder()
        .n_sims(config.n_sims)
        .seed(config.seed)
        .sampling(config.sampling)
        .confidence(config.confidence)
        .build()?;
    engine.build_generator(CorrelationMatrix::new(&matrix, dim)?, ids)
}

/// Builds the generator, markets and assets of `config`.
pub fn build_portfolio(config: &RunConfig) -> std::result::Result<Vec<Rc<dyn Asset>>, SimulationError> {
    let generator = Rc::new(build_generator(config)?);
    let noises: HashSet<&str> = generator.noise_ids().iter().map(String::as_str).collect();

    let mut markets: HashMap<&str, Rc<dyn Market>> = HashMap::new();
    for spec in &config.markets {
        if !noises.contains(spec.name.as_str()) {
            return Err(SimulationError::UnknownNoise(spec.name.clone()));
        }
        let noise: Rc<dyn NoiseSource> = generator.clone();
        let market = BlackScholesMarket::new(
            spec.name.clone(),
            spec.initial_value,
            spec.rate,
            spec.sigma,
            noise,
        )?;
        markets.insert(spec.name.as_str(), Rc::new(market));
    }

    let lookup = |asset: &str, market: &str| {
        markets
            .get(market)
            .cloned()
            .ok_or_else(|| SimulationError::UnknownMarket {
                asset: asset.to_string(),
                market: market.to_string(),
            })
    };

    let mut assets: Vec<Rc<dyn Asset>> = Vec::with_capacity(config.assets.len());
    for spec in &config.assets {
        let maturity = SimDate::new(spec.maturity())?;
        let asset: Rc<dyn Asset> = match spec {
            AssetConfig::EuropeanCall {
                name,
                market,
                strike,
                ..
            } => Rc::new(EuropeanCall::new(
                name.clone(),
                lookup(name, market)?,
                *strike,
                maturity,
            )?),
            AssetConfig::Spread {
                name,
                long,
                short,
                strike,
                ..
            } => Rc::new(SpreadOption::new(
                name.clone(),
                lookup(name, long)?,
                lookup(name, short)?,
                *strike,
                maturity,
            )?),
            AssetConfig::Basket {
                name,
                markets: names,
                weights,
                strike,
                ..
            } => {
                let legs = names
                    .iter()
                    .map(|market| lookup(name, market))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Rc::new(BasketCall::new(name.clone(), legs, weights.clone(), *strike, maturity)?)
            }
        };
        assets.push(asset);
    }
    Ok(assets)
}
