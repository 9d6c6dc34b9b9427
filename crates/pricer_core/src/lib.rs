//! # pricer_core: Foundation for the efficientmc Monte Carlo Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Simulation time and ensemble value types (`types`)
//! - The time-indexed memoisation cache (`cache`)
//! - Normal distribution functions, dense matrices and Cholesky factorisation (`math`)
//! - The contracts shared by markets, instruments and noise sources (`traits`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates. Its only external
//! dependency is `thiserror` for structured errors.
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::cache::{CacheKey, MemoCache};
//! use pricer_core::types::{PathValue, SimDate, SimulationError};
//!
//! let cache: MemoCache<PathValue> = MemoCache::new();
//! let date = SimDate::new(1.0).unwrap();
//!
//! let value = cache
//!     .memoize(date, CacheKey::op("discount_factor"), || {
//!         Ok::<_, SimulationError>(PathValue::Constant((-0.05_f64).exp()))
//!     })
//!     .unwrap();
//! assert!(value.is_constant());
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod math;
pub mod traits;
pub mod types;
