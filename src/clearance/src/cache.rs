//! Decision cache
//!
//! Memoizes clearance decisions keyed on (subject, scope, target) with TTL
//! expiration. The cache is never an authority: identical inputs always
//! produce the same boolean, so concurrent writes for the same key are
//! idempotent and lost updates are harmless. Losing the cache changes
//! latency, never the decision.

use dashmap::DashMap;
use helio_core::CharacterId;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,

    /// Time-to-live for cached decisions
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Cache key type (BLAKE3 hash over subject, scope, target)
type CacheKey = [u8; 32];

/// Cached entry with TTL
#[derive(Clone, Copy)]
struct CachedEntry {
    allowed: bool,
    cached_at: Instant,
}

impl CachedEntry {
    fn new(allowed: bool) -> Self {
        Self {
            allowed,
            cached_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// TTL decision cache
///
/// Constructed once at startup and injected into the engine; tests substitute
/// a disabled cache by not injecting one at all.
pub struct DecisionCache {
    entries: Arc<DashMap<CacheKey, CachedEntry>>,
    config: CacheConfig,
    stats: Arc<DashMap<&'static str, usize>>,
}

impl DecisionCache {
    /// Create a new decision cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
            stats: Arc::new(DashMap::new()),
        }
    }

    /// Look up a cached decision
    pub fn get(&self, subject: CharacterId, scope: &str, target: Option<CharacterId>) -> Option<bool> {
        let key = Self::compute_key(subject, scope, target);

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_expired(self.config.ttl) {
                drop(entry);
                self.entries.remove(&key);
                self.increment_stat("expirations");
                return None;
            }

            self.increment_stat("hits");
            return Some(entry.allowed);
        }

        self.increment_stat("misses");
        None
    }

    /// Store a decision
    pub fn put(&self, subject: CharacterId, scope: &str, target: Option<CharacterId>, allowed: bool) {
        if self.entries.len() >= self.config.capacity {
            self.evict_oldest();
        }

        let key = Self::compute_key(subject, scope, target);
        self.entries.insert(key, CachedEntry::new(allowed));
    }

    /// Drop every entry. Called on policy or organizational changes when a
    /// caller does not want to wait out the TTL.
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
    }

    /// Remove expired entries
    pub fn cleanup_expired(&self) {
        let ttl = self.config.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self.entries.len(),
            max_entries: self.config.capacity,
        }
    }

    /// Cache key: subject id, scope name, and target id (or the fixed marker
    /// "none") bound into one hash. The key deliberately excludes any policy
    /// version; a registry change can serve stale decisions for up to one
    /// TTL, which is the accepted staleness bound.
    fn compute_key(subject: CharacterId, scope: &str, target: Option<CharacterId>) -> CacheKey {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&subject.0.to_le_bytes());
        hasher.update(scope.as_bytes());
        match target {
            Some(target) => hasher.update(&target.0.to_le_bytes()),
            None => hasher.update(b"none"),
        };
        *hasher.finalize().as_bytes()
    }

    /// Evict roughly 10% of entries when at capacity
    fn evict_oldest(&self) {
        let to_remove = (self.config.capacity / 10).max(1);
        let mut removed = 0;

        self.entries.retain(|_, _| {
            if removed < to_remove {
                removed += 1;
                false
            } else {
                true
            }
        });
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats.entry(key).and_modify(|count| *count += 1).or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub expirations: usize,
    pub entries: usize,
    pub max_entries: usize,
}

impl CacheStats {
    /// Cache hit rate in `[0, 1]`
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
