//! # Random Number Generation Infrastructure
//!
//! Noise generation for the date-stepping engine, from raw draws to the
//! correlated matrices consumed by the markets.
//!
//! ## Module Structure
//!
//! - [`PricerRng`]: seeded pseudo-random generator (`rand::StdRng`)
//! - [`LowDiscrepancySequence`] and its implementations: Sobol, Halton,
//!   leaped Halton, van der Corput, Hammersley and Faure
//! - [`SamplingStrategy`]: raw `n_noises × n_sims` standard-normal draws
//! - [`NoiseGenerator`]: one correlated draw per date behind the
//!   [`NoiseSource`](pricer_core::traits::NoiseSource) contract
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::math::CorrelationMatrix;
//! use pricer_core::types::SimDate;
//! use pricer_pricing::rng::{NoiseGenerator, SamplingKind};
//!
//! let correlation = CorrelationMatrix::identity(2);
//! let generator: NoiseGenerator =
//!     NoiseGenerator::new(1_000, correlation, ["eq", "fx"], SamplingKind::Antithetic.build(7))
//!         .unwrap();
//!
//! let noise = generator.all_noises(SimDate::new(1.0).unwrap()).unwrap();
//! assert_eq!(noise.get(0, 500), -noise.get(0, 0));
//! ```
//!
//! All documentation in this module uses British English spelling conventions.

mod generator;
mod prng;
mod qmc;
mod sampling;

pub use generator::NoiseGenerator;
pub use prng::PricerRng;
pub use qmc::{
    first_primes, radical_inverse, Faure, Halton, Hammersley, LeapedHalton,
    LowDiscrepancySequence, Sobol, VanDerCorput,
};
pub use sampling::{
    AntitheticGaussian, IndependentGaussian, LatinHypercube, QmcSequence, QuasiRandom,
    SamplingKind, SamplingStrategy,
};
