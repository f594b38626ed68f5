//! Memoise distance lookups to avoid repeated billed API calls.
//!
//! Only successful lookups are stored. Each fresh success invalidates the
//! previous entry under its key before writing, so a stored value is always
//! the whole of one response and never a merge of two.
//!
//! # Examples
//! ```
//! use std::time::Duration;
//! use courier_core::{CacheKey, DistanceCache, DistanceResult, DistanceUnit, MemoryCache};
//!
//! let cache = MemoryCache::default();
//! let key = CacheKey::from_digest("abc");
//! let value = DistanceResult::from_meters(900.0, DistanceUnit::Metric, "");
//! cache.set(&key, value, Duration::from_secs(60));
//! assert!(cache.get(&key).is_some());
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::{DistanceError, DistanceProvider, DistanceQuery, DistanceResult};

/// Lifetime of a cached lookup.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

const KEY_PREFIX: &str = "courier_distance_";

/// Deterministic digest of every response-affecting query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `query`.
    ///
    /// Fields are separated by a control character so that shifting text
    /// between adjacent fields changes the digest.
    #[must_use]
    pub fn for_query(query: &DistanceQuery) -> Self {
        let mut hasher = Sha256::new();
        let fields = [
            query.api_key.as_str(),
            query.origin.as_str(),
            query.destination.as_str(),
            query.travel_mode.as_str(),
            query.restriction.as_str(),
            query.units.as_str(),
            query.locale.as_str(),
        ];
        for field in fields {
            hasher.update(field.as_bytes());
            hasher.update([0x1f]);
        }
        Self::from_digest(&hex::encode(hasher.finalize()))
    }

    /// Wrap an existing digest.
    #[must_use]
    pub fn from_digest(digest: &str) -> Self {
        Self(format!("{KEY_PREFIX}{digest}"))
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-value store for distance results with per-entry expiry.
///
/// Implementations must be safe to share between concurrent calculations.
pub trait DistanceCache {
    /// Return the unexpired value for `key`.
    fn get(&self, key: &CacheKey) -> Option<DistanceResult>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &CacheKey, value: DistanceResult, ttl: Duration);

    /// Drop any value stored under `key`.
    fn invalidate(&self, key: &CacheKey);
}

impl<C: DistanceCache + ?Sized> DistanceCache for &C {
    fn get(&self, key: &CacheKey) -> Option<DistanceResult> {
        (**self).get(key)
    }

    fn set(&self, key: &CacheKey, value: DistanceResult, ttl: Duration) {
        (**self).set(key, value, ttl);
    }

    fn invalidate(&self, key: &CacheKey) {
        (**self).invalidate(key);
    }
}

impl<C: DistanceCache + ?Sized> DistanceCache for std::sync::Arc<C> {
    fn get(&self, key: &CacheKey) -> Option<DistanceResult> {
        (**self).get(key)
    }

    fn set(&self, key: &CacheKey, value: DistanceResult, ttl: Duration) {
        (**self).set(key, value, ttl);
    }

    fn invalidate(&self, key: &CacheKey) {
        (**self).invalidate(key);
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: DistanceResult,
    /// `None` when the TTL reaches past the clock's range.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process cache backed by a sharded concurrent map.
///
/// Different keys never contend on the same lock. Two concurrent misses on
/// one key may both fetch; the later write wins whole. Every write also
/// evicts expired entries, so the map stays bounded by the distinct queries
/// seen within one TTL.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, Entry>,
}

impl MemoryCache {
    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }
}

impl DistanceCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<DistanceResult> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    fn set(&self, key: &CacheKey, value: DistanceResult, ttl: Duration) {
        self.purge_expired();
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.clone(), Entry { value, expires_at });
    }

    fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }
}

/// Return the cached value for `key` or run `fetch` and store its success.
///
/// Failures are returned as-is and leave the cache untouched.
///
/// # Errors
///
/// Propagates the error returned by `fetch`.
pub fn get_or_fetch<C, F>(
    cache: &C,
    key: &CacheKey,
    ttl: Duration,
    fetch: F,
) -> Result<DistanceResult, DistanceError>
where
    C: DistanceCache + ?Sized,
    F: FnOnce() -> Result<DistanceResult, DistanceError>,
{
    if let Some(hit) = cache.get(key) {
        log::debug!("distance cache hit for {key}");
        return Ok(hit);
    }
    log::debug!("distance cache miss for {key}");
    let result = fetch()?;
    cache.invalidate(key);
    cache.set(key, result.clone(), ttl);
    Ok(result)
}

/// Provider decorator that consults a [`DistanceCache`] first.
///
/// # Examples
/// ```
/// use courier_core::{
///     CachedDistanceProvider, DistanceError, DistanceProvider, DistanceQuery, DistanceResult,
///     MemoryCache,
/// };
///
/// struct Fixed;
///
/// impl DistanceProvider for Fixed {
///     fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
///         Ok(DistanceResult::from_meters(2_000.0, query.units, ""))
///     }
/// }
///
/// let provider = CachedDistanceProvider::new(Fixed, MemoryCache::default());
/// let query = DistanceQuery {
///     api_key: "key".into(),
///     origin: "-6.1,106.8".into(),
///     destination: "Jakarta".into(),
///     travel_mode: Default::default(),
///     restriction: Default::default(),
///     units: Default::default(),
///     locale: "en".into(),
/// };
/// provider.fetch(&query)?;
/// assert_eq!(provider.cache().len(), 1);
/// # Ok::<(), DistanceError>(())
/// ```
#[derive(Debug)]
pub struct CachedDistanceProvider<P, C> {
    provider: P,
    cache: C,
    ttl: Duration,
}

impl<P, C> CachedDistanceProvider<P, C> {
    /// Wrap `provider` with `cache` using [`DEFAULT_TTL`].
    #[must_use]
    pub const fn new(provider: P, cache: C) -> Self {
        Self {
            provider,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the entry lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.provider
    }

    /// The backing cache.
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }
}

impl<P: DistanceProvider, C: DistanceCache> DistanceProvider for CachedDistanceProvider<P, C> {
    fn fetch(&self, query: &DistanceQuery) -> Result<DistanceResult, DistanceError> {
        query.validate()?;
        let key = CacheKey::for_query(query);
        get_or_fetch(&self.cache, &key, self.ttl, || self.provider.fetch(query))
    }
}
