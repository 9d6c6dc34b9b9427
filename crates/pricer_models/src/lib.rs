//! # Pricer Models (L2: Business Logic)
//!
//! Simulated markets, instruments and analytical reference formulas.
//!
//! This crate provides:
//! - Markets implementing [`Market`](pricer_core::traits::Market): the
//!   single-asset [`BlackScholesMarket`](models::BlackScholesMarket) and the
//!   multi-asset [`BlackScholesBasketModel`](models::BlackScholesBasketModel)
//! - Instruments implementing [`Asset`](pricer_core::traits::Asset):
//!   [`EuropeanCall`](instruments::EuropeanCall),
//!   [`SpreadOption`](instruments::SpreadOption) and
//!   [`BasketCall`](instruments::BasketCall)
//! - Closed-form Black-Scholes prices and deltas behind the
//!   [`AnalyticalFormula`](analytical::AnalyticalFormula) capability trait
//!
//! ## Design Principles
//!
//! - **One cache per object**: every market and instrument memoises its own
//!   date-dependent quantities, so sharing a market between instruments
//!   never advances it twice at one date
//! - **Noise is injected**: markets hold an `Rc<dyn NoiseSource>` and never
//!   draw random numbers themselves
//! - **Validation at construction**: invalid parameters fail before any
//!   simulation starts

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;
