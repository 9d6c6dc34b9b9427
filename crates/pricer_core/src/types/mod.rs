//! Core value types shared by every layer.
//!
//! - [`SimDate`]: totally ordered simulation date (year fraction from origin)
//! - [`PathValue`]: per-path quantity, either a broadcast constant or one value per path
//! - [`SimulationError`]: the error type of the engine's public contracts

pub mod error;
pub mod path_value;
pub mod time;

pub use error::SimulationError;
pub use path_value::PathValue;
pub use time::SimDate;
