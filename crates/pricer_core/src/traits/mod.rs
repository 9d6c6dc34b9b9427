//! Contracts between the layers of the engine.
//!
//! This module defines the abstractions the orchestrator is written against:
//! - [`NoiseSource`]: correlated Gaussian draws per simulation date
//! - [`Market`]: a simulated price process with discounting
//! - [`Asset`]: an instrument producing cash-flows and exercised volumes
//!
//! All three take `&self` and memoise internally, one
//! [`MemoCache`](crate::cache::MemoCache) per object, so that shared objects
//! can be queried by any number of consumers per date and still compute
//! each quantity once. Objects are shared through `Rc`; the engine is
//! single-threaded.

pub mod asset;
pub mod market;
pub mod noise;

pub use asset::Asset;
pub use market::Market;
pub use noise::NoiseSource;
