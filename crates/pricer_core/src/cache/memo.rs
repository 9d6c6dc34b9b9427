//! Memoisation protocol over a [`DateCache`].

use std::cell::RefCell;

use super::date_cache::DateCache;
use super::error::CacheError;
use super::key::{CacheKey, KeyPart};
use crate::types::SimDate;

/// Interior-mutable [`DateCache`] used by `&self` simulation methods.
///
/// [`MemoCache::memoize`] is the only way values enter the cache:
///
/// 1. if the cache holds another date, it is flushed first;
/// 2. if `key` has no value for `date`, `compute` runs and its result is
///    registered;
/// 3. the cached value is returned.
///
/// The `RefCell` borrow is not held while `compute` runs, so a computation
/// may call other memoised operations of the same owner. The type is `!Sync`.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use pricer_core::cache::{CacheKey, MemoCache};
/// use pricer_core::types::{SimDate, SimulationError};
///
/// let calls = Cell::new(0);
/// let cache: MemoCache<f64> = MemoCache::new();
/// let date = SimDate::new(1.0).unwrap();
///
/// for _ in 0..3 {
///     let v = cache
///         .memoize(date, CacheKey::op("spot"), || {
///             calls.set(calls.get() + 1);
///             Ok::<_, SimulationError>(42.0)
///         })
///         .unwrap();
///     assert_eq!(v, 42.0);
/// }
/// assert_eq!(calls.get(), 1);
/// ```
#[derive(Debug)]
pub struct MemoCache<V> {
    inner: RefCell<DateCache<V>>,
}

impl<V: Clone> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> MemoCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(DateCache::new()),
        }
    }

    /// Returns the value of `key` for `date`, computing it at most once per date.
    ///
    /// # Errors
    ///
    /// Propagates any error of `compute`; in that case nothing is cached.
    /// A [`CacheError`] surfaces if `compute` itself moved the cache to a
    /// different date.
    pub fn memoize<F, E>(&self, date: SimDate, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
        E: From<CacheError>,
    {
        {
            let mut cache = self.inner.borrow_mut();
            if matches!(cache.current_date(), Some(active) if active != date) {
                cache.flush();
            }
            if let Ok(value) = cache.get(&key) {
                return Ok(value.clone());
            }
        }

        let value = compute()?;

        let mut cache = self.inner.borrow_mut();
        if !cache.contains(&key) {
            cache.register(date, key.clone(), value)?;
        }
        Ok(cache.get(&key)?.clone())
    }

    /// Last committed `(date, value)` of `operation(args)`.
    pub fn previous(
        &self,
        operation: &'static str,
        args: &[KeyPart],
    ) -> Result<(SimDate, V), CacheError> {
        let cache = self.inner.borrow();
        cache
            .get_previous(operation, args)
            .map(|(date, value)| (date, value.clone()))
    }

    /// Commits the active date to the history.
    pub fn flush(&self) {
        self.inner.borrow_mut().flush();
    }

    /// The active date, if any.
    pub fn current_date(&self) -> Option<SimDate> {
        self.inner.borrow().current_date()
    }

    /// Returns `true` if `key` has a value for the active date.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.borrow().contains(key)
    }

    /// Number of values held for the active date.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when no value is held for the active date.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
