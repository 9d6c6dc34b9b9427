//! Date-scoped memoisation.
//!
//! Every market, instrument and noise generator owns one cache. Within a
//! simulation date, each memoised operation is computed at most once; when a
//! different date is requested the current entries are committed to a
//! one-slot history per key, which is how Markov state (the last simulated
//! value of a market) is carried from one date to the next.
//!
//! ## Features
//!
//! - [`CacheKey`] / [`KeyPart`]: composite keys of an operation name and its
//!   positional arguments. The date is never part of a key.
//! - [`DateCache`]: the store itself, enforcing a single active date.
//! - [`MemoCache`]: interior-mutable wrapper implementing the memoisation
//!   protocol for `&self` methods.

mod date_cache;
mod error;
mod key;
mod memo;

pub use date_cache::DateCache;
pub use error::CacheError;
pub use key::{CacheKey, KeyPart};
pub use memo::MemoCache;
