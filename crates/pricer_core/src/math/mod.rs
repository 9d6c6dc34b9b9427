//! Numerical building blocks.
//!
//! - [`matrix`]: dense row-major `f64` matrices (noise draws are `n_noises × n_sims`)
//! - [`distributions`]: standard normal pdf, cdf and inverse cdf
//! - [`correlation`]: correlation matrix validation and Cholesky factorisation

pub mod correlation;
pub mod distributions;
pub mod matrix;

pub use correlation::{CholeskyFactor, CorrelationError, CorrelationMatrix};
pub use distributions::{norm_cdf, norm_inv_cdf, norm_pdf};
pub use matrix::Matrix;
