//! Expiring key-value store
//!
//! Provides a `WeatherCache` that keeps values in memory alongside the time
//! they were stored. There is no size bound and no LRU policy; time is the
//! only eviction criterion.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Default lifetime of a cache entry
pub const DEFAULT_EXPIRY_MINUTES: i64 = 5;

/// A cached value together with the moment it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now - self.stored_at >= expiry
    }
}

/// Time-bounded memoization keyed by an opaque string
///
/// An entry is valid while `now - stored_at < expiry`. Reads never refresh
/// an entry's age. Access is single-threaded; callers share the cache through
/// `&mut` rather than a lock.
#[derive(Debug)]
pub struct WeatherCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    expiry: Duration,
}

impl<V> Default for WeatherCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> WeatherCache<V> {
    /// Creates a cache with the default five minute expiry
    pub fn new() -> Self {
        Self::with_expiry(Duration::minutes(DEFAULT_EXPIRY_MINUTES))
    }

    /// Creates a cache whose entries live for `expiry`
    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            expiry,
        }
    }

    /// How long an entry stays valid after being stored
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Number of entries currently held, including any not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key` if it has not expired
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_at(key, Utc::now())
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Utc::now());
    }

    /// Removes every expired entry and returns how many were dropped
    pub fn clear_expired(&mut self) -> usize {
        self.clear_expired_at(Utc::now())
    }

    /// `get` evaluated at an explicit point in time
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<&V> {
        let expired = self.entries.get(key)?.is_expired(now, self.expiry);

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| &entry.value)
    }

    /// `set` with an explicit storage time
    pub fn set_at(&mut self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// `clear_expired` evaluated at an explicit point in time
    pub fn clear_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let expiry = self.expiry;
        self.entries.retain(|_, entry| !entry.is_expired(now, expiry));
        before - self.entries.len()
    }
}
