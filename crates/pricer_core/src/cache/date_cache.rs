//! The single-date memoisation store.

use std::collections::HashMap;

use super::error::CacheError;
use super::key::{CacheKey, KeyPart};
use crate::types::SimDate;

/// Per-object store of values computed for one simulation date.
///
/// `current` holds the values of the active date; `previous` holds, per key,
/// the last committed `(date, value)` pair. Values of at most one date are
/// ever held in `current`.
///
/// # Examples
///
/// ```
/// use pricer_core::cache::{CacheKey, DateCache};
/// use pricer_core::types::SimDate;
///
/// let d1 = SimDate::new(1.0).unwrap();
/// let d2 = SimDate::new(2.0).unwrap();
/// let key = CacheKey::op("simulate");
///
/// let mut cache = DateCache::new();
/// cache.register(d1, key.clone(), 1.5).unwrap();
/// assert!(cache.register(d2, key.clone(), 1.7).is_err());
///
/// cache.flush();
/// assert!(cache.get(&key).is_err());
/// assert_eq!(cache.get_previous("simulate", &[]).unwrap(), (d1, &1.5));
/// ```
#[derive(Clone, Debug)]
pub struct DateCache<V> {
    current_date: Option<SimDate>,
    current: HashMap<CacheKey, V>,
    previous: HashMap<CacheKey, (SimDate, V)>,
}

impl<V> Default for DateCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DateCache<V> {
    /// Creates an empty cache with no active date.
    pub fn new() -> Self {
        Self {
            current_date: None,
            current: HashMap::new(),
            previous: HashMap::new(),
        }
    }

    /// Builds the key of `operation` called with `args`.
    pub fn make_key(operation: &'static str, args: &[KeyPart]) -> CacheKey {
        CacheKey::new(operation, args.to_vec())
    }

    /// Stores `value` under `key` for `date`.
    ///
    /// The first registration after a flush makes `date` the active date.
    ///
    /// # Errors
    ///
    /// [`CacheError::DateMismatch`] if another date is active.
    pub fn register(&mut self, date: SimDate, key: CacheKey, value: V) -> Result<(), CacheError> {
        match self.current_date {
            Some(active) if active != date => {
                return Err(CacheError::DateMismatch {
                    active,
                    requested: date,
                })
            }
            Some(_) => {}
            None => self.current_date = Some(date),
        }
        self.current.insert(key, value);
        Ok(())
    }

    /// Value of `key` for the active date.
    pub fn get(&self, key: &CacheKey) -> Result<&V, CacheError> {
        self.current
            .get(key)
            .ok_or_else(|| CacheError::MissingKey(key.to_string()))
    }

    /// Returns `true` if `key` has a value for the active date.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.current.contains_key(key)
    }

    /// The active date, if any value is held.
    pub fn current_date(&self) -> Option<SimDate> {
        self.current_date
    }

    /// Number of values held for the active date.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` when no value is held for the active date.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Last committed `(date, value)` of `operation(args)`.
    ///
    /// # Errors
    ///
    /// [`CacheError::NoHistory`] if that key was never flushed.
    pub fn get_previous(
        &self,
        operation: &'static str,
        args: &[KeyPart],
    ) -> Result<(SimDate, &V), CacheError> {
        let key = Self::make_key(operation, args);
        self.previous
            .get(&key)
            .map(|(date, value)| (*date, value))
            .ok_or_else(|| CacheError::NoHistory(key.to_string()))
    }

    /// Commits the active date's values to the history and clears them.
    ///
    /// Keys that were not recomputed keep their older history entry.
    pub fn flush(&mut self) {
        if let Some(date) = self.current_date.take() {
            for (key, value) in self.current.drain() {
                self.previous.insert(key, (date, value));
            }
        }
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(years: f64) -> SimDate {
        SimDate::new(years).unwrap()
    }

    #[test]
    fn test_register_sets_active_date() {
        let mut cache = DateCache::new();
        assert_eq!(cache.current_date(), None);
        cache.register(date(0.5), CacheKey::op("spot"), 10.0).unwrap();
        assert_eq!(cache.current_date(), Some(date(0.5)));
        assert_eq!(cache.get(&CacheKey::op("spot")), Ok(&10.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_register_same_date_many_keys() {
        let mut cache = DateCache::new();
        cache.register(date(1.0), CacheKey::op("spot"), 1.0).unwrap();
        cache
            .register(date(1.0), CacheKey::op("discount_factor"), 0.9)
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_register_other_date_fails() {
        let mut cache = DateCache::new();
        cache.register(date(1.0), CacheKey::op("spot"), 1.0).unwrap();
        let err = cache
            .register(date(2.0), CacheKey::op("spot"), 2.0)
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::DateMismatch {
                active: date(1.0),
                requested: date(2.0)
            }
        );
        // The rejected value was not stored.
        assert_eq!(cache.get(&CacheKey::op("spot")), Ok(&1.0));
    }

    #[test]
    fn test_missing_key() {
        let cache: DateCache<f64> = DateCache::new();
        let err = cache.get(&CacheKey::op("spot")).unwrap_err();
        assert_eq!(err, CacheError::MissingKey("spot()".to_string()));
    }

    #[test]
    fn test_flush_moves_current_into_previous() {
        let mut cache = DateCache::new();
        let key = DateCache::<f64>::make_key("noises", &["a".into()]);
        cache.register(date(1.0), key.clone(), 3.0).unwrap();
        cache.flush();

        assert!(cache.is_empty());
        assert_eq!(cache.current_date(), None);
        assert!(cache.get(&key).is_err());
        assert_eq!(cache.get_previous("noises", &["a".into()]), Ok((date(1.0), &3.0)));
        assert!(matches!(
            cache.get_previous("noises", &["b".into()]),
            Err(CacheError::NoHistory(_))
        ));
    }

    #[test]
    fn test_previous_keeps_one_snapshot_per_key() {
        let mut cache = DateCache::new();
        cache.register(date(1.0), CacheKey::op("simulate"), 1.0).unwrap();
        cache.register(date(1.0), CacheKey::op("spot"), 100.0).unwrap();
        cache.flush();
        cache.register(date(2.0), CacheKey::op("simulate"), 1.1).unwrap();
        cache.flush();

        assert_eq!(cache.get_previous("simulate", &[]), Ok((date(2.0), &1.1)));
        assert_eq!(cache.get_previous("spot", &[]), Ok((date(1.0), &100.0)));
    }

    #[test]
    fn test_flush_on_empty_cache_is_noop() {
        let mut cache: DateCache<f64> = DateCache::new();
        cache.flush();
        assert!(cache.is_empty());
        assert!(cache.get_previous("simulate", &[]).is_err());
    }
}
