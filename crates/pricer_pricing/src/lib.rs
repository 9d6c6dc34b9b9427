//! # pricer_pricing: Monte Carlo Engine (Layer 3)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing turns the contracts of `pricer_core` into a running
//! simulation:
//! - Noise generation: seeded PRNG, low-discrepancy sequences, sampling
//!   strategies and the correlated [`NoiseGenerator`](rng::NoiseGenerator)
//! - Date-stepping orchestration over a portfolio of assets ([`mc::run_mc`])
//! - Aggregation into mark-to-market and delta estimates with confidence
//!   intervals ([`mc::get_mtm`], [`mc::get_delta`])
//!
//! The engine depends only on `pricer_core`; concrete markets and
//! instruments live in `pricer_models` and plug in through the
//! [`Market`](pricer_core::traits::Market) and
//! [`Asset`](pricer_core::traits::Asset) traits.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use pricer_core::math::CorrelationMatrix;
//! use pricer_core::traits::{Asset, Market};
//! use pricer_core::types::SimDate;
//! use pricer_models::instruments::EuropeanCall;
//! use pricer_models::models::BlackScholesMarket;
//! use pricer_pricing::mc::{get_delta, get_mtm, run_mc, EngineConfig};
//! use pricer_pricing::rng::SamplingKind;
//!
//! let config = EngineConfig::builder()
//!     .n_sims(4_096)
//!     .sampling(SamplingKind::Sobol)
//!     .build()
//!     .unwrap();
//! let generator = Rc::new(config.build_generator(CorrelationMatrix::identity(1), ["eq"]).unwrap());
//!
//! let market: Rc<dyn Market> =
//!     Rc::new(BlackScholesMarket::new("eq", 100.0, 0.0, 0.2, generator).unwrap());
//! let maturity = SimDate::new(1.0).unwrap();
//! let call: Rc<dyn Asset> =
//!     Rc::new(EuropeanCall::new("atm", Rc::clone(&market), 100.0, maturity).unwrap());
//!
//! let output = run_mc(&[call]).unwrap();
//! let mtm = get_mtm(&output, config.confidence()).unwrap();
//! let delta = get_delta(&output, config.confidence()).unwrap();
//!
//! assert!((mtm["atm"].mean - 7.9656).abs() < 0.1);
//! assert!((delta[&("atm".to_string(), "eq".to_string())].mean - 0.5398).abs() < 0.02);
//! ```

#![warn(missing_docs)]

pub mod mc;
pub mod rng;
