//! Session cache of resolved executable locations.
//!
//! The cache keeps logical stores per key (resolved path, availability flag,
//! winning discovery method, reported version) that share one last-write
//! timestamp. A
//! cached `None` path means "resolved as absent" and is distinct from a miss.
//!
//! With a finite TTL, reads evict an expired key before reporting the miss.
//! Without one, entries live for the whole session.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::search::DiscoveryMethod;

#[derive(Debug, Default)]
struct CacheState {
    paths: HashMap<String, Option<String>>,
    availability: HashMap<String, bool>,
    methods: HashMap<String, DiscoveryMethod>,
    versions: HashMap<String, String>,
    timestamps: HashMap<String, Instant>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        self.timestamps.insert(key.to_string(), Instant::now());
    }

    fn remove(&mut self, key: &str) {
        self.paths.remove(key);
        self.availability.remove(key);
        self.methods.remove(key);
        self.versions.remove(key);
        self.timestamps.remove(key);
    }

    fn is_expired(&self, key: &str, ttl: Option<Duration>) -> bool {
        match (ttl, self.timestamps.get(key)) {
            (Some(ttl), Some(written)) => written.elapsed() > ttl,
            _ => false,
        }
    }

    fn evict_if_expired(&mut self, key: &str, ttl: Option<Duration>) {
        if self.is_expired(key, ttl) {
            tracing::debug!("Path cache entry '{}' expired", key);
            self.remove(key);
        }
    }
}

/// Memo of executable resolutions, shared by every handler in a session.
///
/// All operations take `&self`; the state sits behind a mutex so the cache
/// can be shared across the discovery fan-out.
#[derive(Debug, Default)]
pub struct PathCache {
    ttl: Option<Duration>,
    state: Mutex<CacheState>,
}

impl PathCache {
    /// Create a cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire `ttl` after their last write.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            state: Mutex::default(),
        }
    }

    /// The configured time-to-live, `None` meaning session lifetime.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a resolved path.
    ///
    /// Returns `None` on a miss, `Some(None)` when the executable was
    /// confirmed absent, and `Some(Some(path))` when it was found.
    pub fn get_path(&self, key: &str) -> Option<Option<String>> {
        let mut state = self.lock();
        state.evict_if_expired(key, self.ttl);
        state.paths.get(key).cloned()
    }

    /// Record a resolution; `None` records a confirmed absence.
    pub fn set_path(&self, key: &str, path: Option<String>) {
        let mut state = self.lock();
        state.paths.insert(key.to_string(), path);
        state.touch(key);
    }

    /// Look up a cached availability flag.
    pub fn get_availability(&self, key: &str) -> Option<bool> {
        let mut state = self.lock();
        state.evict_if_expired(key, self.ttl);
        state.availability.get(key).copied()
    }

    /// Record an availability flag.
    pub fn set_availability(&self, key: &str, available: bool) {
        let mut state = self.lock();
        state.availability.insert(key.to_string(), available);
        state.touch(key);
    }

    /// Look up which tier produced the cached path.
    pub fn get_method(&self, key: &str) -> Option<DiscoveryMethod> {
        let mut state = self.lock();
        state.evict_if_expired(key, self.ttl);
        state.methods.get(key).copied()
    }

    /// Record which tier produced the cached path.
    pub fn set_method(&self, key: &str, method: DiscoveryMethod) {
        let mut state = self.lock();
        state.methods.insert(key.to_string(), method);
        state.touch(key);
    }

    /// Look up the version the executable reported when it was resolved.
    pub fn get_version(&self, key: &str) -> Option<String> {
        let mut state = self.lock();
        state.evict_if_expired(key, self.ttl);
        state.versions.get(key).cloned()
    }

    pub fn set_version(&self, key: &str, version: &str) {
        let mut state = self.lock();
        state.versions.insert(key.to_string(), version.to_string());
        state.touch(key);
    }

    /// Drop everything cached for `key`.
    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        *self.lock() = CacheState::default();
    }

    /// Whether `key` has a live path or availability entry.
    pub fn has(&self, key: &str) -> bool {
        let mut state = self.lock();
        state.evict_if_expired(key, self.ttl);
        state.paths.contains_key(key) || state.availability.contains_key(key)
    }

    /// Number of keys with any cached data.
    pub fn size(&self) -> usize {
        self.lock().timestamps.len()
    }

    /// Live keys, sorted.
    pub fn list_keys(&self) -> Vec<String> {
        let mut state = self.lock();
        let expired: Vec<String> = state
            .timestamps
            .keys()
            .filter(|key| state.is_expired(key, self.ttl))
            .cloned()
            .collect();
        for key in &expired {
            state.remove(key);
        }

        let mut keys: Vec<String> = state.timestamps.keys().cloned().collect();
        keys.sort();
        keys
    }
}
