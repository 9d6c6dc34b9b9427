//! Sampling strategies producing raw standard-normal noise.
//!
//! A strategy returns an `n_noises × n_sims` matrix whose rows are
//! independent and approximately standard normal; correlation is injected
//! afterwards by the [`NoiseGenerator`](super::NoiseGenerator).
//!
//! ## Strategies
//!
//! - [`IndependentGaussian`]: i.i.d. draws from a seeded [`PricerRng`]
//! - [`AntitheticGaussian`]: half the paths drawn, the other half mirrored
//! - [`LatinHypercube`]: one uniform per stratum, strata shuffled per dimension
//! - [`QuasiRandom`]: a [`QmcSequence`] mapped through the inverse normal CDF
//!
//! [`SamplingKind`] selects a strategy by name at run time.

use std::fmt;
use std::str::FromStr;

use pricer_core::math::{norm_inv_cdf, Matrix};
use pricer_core::types::SimulationError;

use super::prng::PricerRng;
use super::qmc::{
    Faure, Halton, Hammersley, LeapedHalton, LowDiscrepancySequence, Sobol, VanDerCorput,
};

/// Source of raw (uncorrelated) standard-normal draws.
pub trait SamplingStrategy {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Draws an `n_noises × n_sims` matrix.
    ///
    /// # Errors
    ///
    /// Strategy-specific configuration errors, such as an odd path count for
    /// antithetic sampling or too many dimensions for a Sobol sequence.
    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError>;
}

impl<S: SamplingStrategy + ?Sized> SamplingStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
        (**self).sample(n_noises, n_sims)
    }
}

/// Independent standard-normal draws.
#[derive(Clone, Debug)]
pub struct IndependentGaussian {
    rng: PricerRng,
}

impl IndependentGaussian {
    /// Creates a sampler seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: PricerRng::from_seed(seed),
        }
    }
}

impl SamplingStrategy for IndependentGaussian {
    fn name(&self) -> &'static str {
        "independent"
    }

    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
        let mut noise = Matrix::zeros(n_noises, n_sims);
        for row in 0..n_noises {
            self.rng.fill_normal(noise.row_mut(row));
        }
        Ok(noise)
    }
}

/// Antithetic variates: column `n/2 + j` is the negation of column `j`.
///
/// ```rust
/// use pricer_pricing::rng::{AntitheticGaussian, SamplingStrategy};
///
/// let mut sampler = AntitheticGaussian::new(7);
/// let noise = sampler.sample(1, 4).unwrap();
/// assert_eq!(noise.get(0, 2), -noise.get(0, 0));
/// assert!(sampler.sample(1, 3).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct AntitheticGaussian {
    rng: PricerRng,
}

impl AntitheticGaussian {
    /// Creates a sampler seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: PricerRng::from_seed(seed),
        }
    }
}

impl SamplingStrategy for AntitheticGaussian {
    fn name(&self) -> &'static str {
        "antithetic"
    }

    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
        if n_sims % 2 != 0 {
            return Err(SimulationError::OddPathCount(n_sims));
        }
        let half = n_sims / 2;
        let mut noise = Matrix::zeros(n_noises, n_sims);
        for row in 0..n_noises {
            let values = noise.row_mut(row);
            let (drawn, mirrored) = values.split_at_mut(half);
            self.rng.fill_normal(drawn);
            for (m, d) in mirrored.iter_mut().zip(drawn.iter()) {
                *m = -*d;
            }
        }
        Ok(noise)
    }
}

/// Latin hypercube sampling.
///
/// Each dimension is cut into `n_sims` equal strata; every stratum receives
/// exactly one uniform draw and the strata are permuted independently per
/// dimension before the inverse normal transform.
#[derive(Clone, Debug)]
pub struct LatinHypercube {
    rng: PricerRng,
}

impl LatinHypercube {
    /// Creates a sampler seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: PricerRng::from_seed(seed),
        }
    }
}

impl SamplingStrategy for LatinHypercube {
    fn name(&self) -> &'static str {
        "latin_hypercube"
    }

    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
        let width = n_sims as f64;
        let mut strata: Vec<usize> = (0..n_sims).collect();
        let mut noise = Matrix::zeros(n_noises, n_sims);
        for row in 0..n_noises {
            self.rng.shuffle(&mut strata);
            for (out, &stratum) in noise.row_mut(row).iter_mut().zip(&strata) {
                // u = 0 would put the point on the stratum edge at -inf for stratum 0.
                let u = self.rng.gen_uniform().max(f64::EPSILON);
                *out = norm_inv_cdf((stratum as f64 + u) / width);
            }
        }
        Ok(noise)
    }
}

/// Low-discrepancy sequence selector for [`QuasiRandom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QmcSequence {
    /// [`Sobol`]
    Sobol,
    /// [`Halton`]
    Halton,
    /// [`LeapedHalton`]
    LeapedHalton,
    /// [`VanDerCorput`]
    VanDerCorput,
    /// [`Hammersley`]
    Hammersley,
    /// [`Faure`]
    Faure,
}

impl QmcSequence {
    /// Identifier of the sequence.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sobol => "sobol",
            Self::Halton => "halton",
            Self::LeapedHalton => "leaped_halton",
            Self::VanDerCorput => "van_der_corput",
            Self::Hammersley => "hammersley",
            Self::Faure => "faure",
        }
    }

    /// Builds a fresh sequence of `dimension` coordinates for `n_points` points.
    ///
    /// # Errors
    ///
    /// [`SimulationError::DimensionLimit`] for dimension-limited sequences.
    pub fn build(
        self,
        dimension: usize,
        n_points: usize,
    ) -> Result<Box<dyn LowDiscrepancySequence>, SimulationError> {
        let sequence: Box<dyn LowDiscrepancySequence> = match self {
            Self::Sobol => Box::new(Sobol::new(dimension)?),
            Self::Halton => Box::new(Halton::new(dimension)),
            Self::LeapedHalton => Box::new(LeapedHalton::new(dimension)?),
            Self::VanDerCorput => Box::new(VanDerCorput::new(dimension)),
            Self::Hammersley => Box::new(Hammersley::new(dimension, n_points)?),
            Self::Faure => Box::new(Faure::new(dimension)),
        };
        Ok(sequence)
    }
}

/// Quasi-Monte Carlo sampler.
///
/// Point `j` of the sequence fills column `j`; each coordinate is mapped
/// through the inverse normal CDF. Every call to
/// [`sample`](SamplingStrategy::sample) consumes the next `n_noises`
/// dimensions of the sequence, so successive dates see different
/// coordinates and a path is one point of a `dates × n_noises` dimensional
/// sequence. Two fresh samplers return identical draws.
///
/// ```rust
/// use pricer_pricing::rng::{QmcSequence, QuasiRandom, SamplingStrategy};
///
/// let mut sampler = QuasiRandom::new(QmcSequence::Sobol);
/// let first = sampler.sample(2, 3).unwrap();
/// // First Sobol point is (0.5, 0.5).
/// assert_eq!(first.get(0, 0), 0.0);
/// assert_eq!(first.get(1, 0), 0.0);
/// assert_eq!(sampler.dimensions_used(), 2);
///
/// let second = sampler.sample(2, 3).unwrap();
/// assert_ne!(first, second);
/// assert_eq!(sampler.dimensions_used(), 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct QuasiRandom {
    sequence: QmcSequence,
    next_dimension: usize,
}

impl QuasiRandom {
    /// Creates a sampler over `sequence`, starting at its first dimension.
    pub fn new(sequence: QmcSequence) -> Self {
        Self {
            sequence,
            next_dimension: 0,
        }
    }

    /// Underlying sequence.
    pub fn sequence(&self) -> QmcSequence {
        self.sequence
    }

    /// Number of dimensions consumed by previous calls.
    pub fn dimensions_used(&self) -> usize {
        self.next_dimension
    }

    /// Restarts at the first dimension.
    pub fn reset(&mut self) {
        self.next_dimension = 0;
    }
}

impl SamplingStrategy for QuasiRandom {
    fn name(&self) -> &'static str {
        self.sequence.name()
    }

    fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
        let first = self.next_dimension;
        let total = first + n_noises;
        let mut sequence = self.sequence.build(total, n_sims)?;
        let mut noise = Matrix::zeros(n_noises, n_sims);
        for col in 0..n_sims {
            let point = sequence.next_point();
            for (row, &u) in point[first..].iter().enumerate() {
                noise.set(row, col, norm_inv_cdf(u));
            }
        }
        self.next_dimension = total;
        Ok(noise)
    }
}

/// Sampling strategy selected by name.
///
/// ```rust
/// use pricer_pricing::rng::SamplingKind;
///
/// let kind: SamplingKind = "latin_hypercube".parse().unwrap();
/// assert_eq!(kind, SamplingKind::LatinHypercube);
/// assert_eq!(kind.to_string(), "latin_hypercube");
///
/// let mut sampler = SamplingKind::Sobol.build(0);
/// assert_eq!(sampler.name(), "sobol");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplingKind {
    /// [`IndependentGaussian`]
    #[default]
    Independent,
    /// [`AntitheticGaussian`]
    Antithetic,
    /// [`LatinHypercube`]
    LatinHypercube,
    /// Sobol [`QuasiRandom`]
    Sobol,
    /// Halton [`QuasiRandom`]
    Halton,
    /// Leaped Halton [`QuasiRandom`]
    LeapedHalton,
    /// Van der Corput [`QuasiRandom`]
    VanDerCorput,
    /// Hammersley [`QuasiRandom`]
    Hammersley,
    /// Faure [`QuasiRandom`]
    Faure,
}

impl SamplingKind {
    /// Every strategy, in declaration order.
    pub const ALL: [SamplingKind; 9] = [
        Self::Independent,
        Self::Antithetic,
        Self::LatinHypercube,
        Self::Sobol,
        Self::Halton,
        Self::LeapedHalton,
        Self::VanDerCorput,
        Self::Hammersley,
        Self::Faure,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Antithetic => "antithetic",
            Self::LatinHypercube => "latin_hypercube",
            Self::Sobol => "sobol",
            Self::Halton => "halton",
            Self::LeapedHalton => "leaped_halton",
            Self::VanDerCorput => "van_der_corput",
            Self::Hammersley => "hammersley",
            Self::Faure => "faure",
        }
    }

    /// Low-discrepancy sequence behind a quasi-random kind.
    pub fn qmc_sequence(self) -> Option<QmcSequence> {
        match self {
            Self::Independent | Self::Antithetic | Self::LatinHypercube => None,
            Self::Sobol => Some(QmcSequence::Sobol),
            Self::Halton => Some(QmcSequence::Halton),
            Self::LeapedHalton => Some(QmcSequence::LeapedHalton),
            Self::VanDerCorput => Some(QmcSequence::VanDerCorput),
            Self::Hammersley => Some(QmcSequence::Hammersley),
            Self::Faure => Some(QmcSequence::Faure),
        }
    }

    /// Returns `true` if the strategy ignores the seed.
    ///
    /// Two generators built from such a kind draw identical rows; noises
    /// that must be independent belong in one generator with a
    /// block-diagonal correlation matrix.
    pub fn is_deterministic(self) -> bool {
        self.qmc_sequence().is_some()
    }

    /// Builds the strategy; `seed` is ignored by quasi-random kinds.
    pub fn build(self, seed: u64) -> Box<dyn SamplingStrategy> {
        match self {
            Self::Independent => Box::new(IndependentGaussian::new(seed)),
            Self::Antithetic => Box::new(AntitheticGaussian::new(seed)),
            Self::LatinHypercube => Box::new(LatinHypercube::new(seed)),
            Self::Sobol => Box::new(QuasiRandom::new(QmcSequence::Sobol)),
            Self::Halton => Box::new(QuasiRandom::new(QmcSequence::Halton)),
            Self::LeapedHalton => Box::new(QuasiRandom::new(QmcSequence::LeapedHalton)),
            Self::VanDerCorput => Box::new(QuasiRandom::new(QmcSequence::VanDerCorput)),
            Self::Hammersley => Box::new(QuasiRandom::new(QmcSequence::Hammersley)),
            Self::Faure => Box::new(QuasiRandom::new(QmcSequence::Faure)),
        }
    }
}

impl fmt::Display for SamplingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| {
                SimulationError::InvalidConfig(format!(
                    "unknown sampling strategy '{}', expected one of: {}",
                    s,
                    Self::ALL.map(SamplingKind::as_str).join(", ")
                ))
            })
    }
}
