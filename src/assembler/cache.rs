//! Result cache for duplicate requests.
//!
//! Entries are looked up by a SHA-256 [`ContentHash`] of the request and
//! then compared by value, so a hit is only ever returned for an equal
//! [`PromptRequest`]. Capacity is bounded with least-recently-used eviction
//! and entries expire after a TTL.
//!
//! ```ignore
//! let cache = ResultCache::new(CacheConfig::new(64));
//! if let Some(prompt) = cache.get(&request) {
//!     return prompt;
//! }
//! cache.insert(&request, prompt.clone());
//! ```

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::types::GeneratedPrompt;
use crate::input::PromptRequest;

/// Hex-encoded SHA-256 of a request's fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes every field of `request`, each length-prefixed so that field
    /// boundaries cannot collide.
    pub fn from_request(request: &PromptRequest) -> Self {
        let mut hasher = Sha256::new();
        let mut feed = |value: &str| {
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };

        feed(request.task());
        feed(request.audience());
        feed(request.tone());
        feed(request.format().display_name());
        feed(request.complexity().display_name());
        feed(&request.constraints().len().to_string());
        for constraint in request.constraints() {
            feed(constraint);
        }
        feed(request.context().unwrap_or_default());
        feed(if request.context().is_some() { "1" } else { "0" });
        feed(if request.examples_needed() { "1" } else { "0" });

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the hash string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for the result cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Entries older than this are treated as absent.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 128,
            ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl CacheConfig {
    /// Create a cache configuration with the given capacity.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Default::default()
        }
    }

    /// Set the TTL for cache entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Cache statistics for monitoring and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_added: u64,
    pub entries_evicted: u64,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0, or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    request: PromptRequest,
    prompt: GeneratedPrompt,
    created_at: Instant,
    last_accessed: Instant,
}

/// Thread-safe cache of generated prompts keyed by request value.
pub struct ResultCache {
    entries: RwLock<HashMap<ContentHash, CacheEntry>>,
    config: CacheConfig,
    stats: RwLock<CacheStats>,
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Returns the cached prompt for a request equal to `request`, if fresh.
    pub fn get(&self, request: &PromptRequest) -> Option<GeneratedPrompt> {
        let hash = ContentHash::from_request(request);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let expired = entries
            .get(&hash)
            .is_some_and(|entry| entry.created_at.elapsed() >= self.config.ttl);
        if expired {
            entries.remove(&hash);
            self.record(|stats| stats.entries_evicted += 1);
        }

        let hit = entries
            .get_mut(&hash)
            .filter(|entry| entry.request == *request)
            .map(|entry| {
                entry.last_accessed = Instant::now();
                entry.prompt.clone()
            });

        if hit.is_some() {
            self.record(|stats| stats.hits += 1);
        } else {
            self.record(|stats| stats.misses += 1);
        }
        hit
    }

    /// Stores `prompt` as the result for `request`.
    pub fn insert(&self, request: &PromptRequest, prompt: GeneratedPrompt) {
        if self.config.max_entries == 0 {
            return;
        }

        let hash = ContentHash::from_request(request);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        self.evict_expired(&mut entries);
        if !entries.contains_key(&hash) && entries.len() >= self.config.max_entries {
            self.evict_oldest(&mut entries);
        }

        let now = Instant::now();
        entries.insert(
            hash,
            CacheEntry {
                request: request.clone(),
                prompt,
                created_at: now,
                last_accessed: now,
            },
        );
        self.record(|stats| stats.entries_added += 1);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }

    /// Evict the least recently used entry.
    fn evict_oldest(&self, entries: &mut HashMap<ContentHash, CacheEntry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(hash, _)| hash.clone());

        if let Some(hash) = oldest {
            entries.remove(&hash);
            self.record(|stats| stats.entries_evicted += 1);
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<ContentHash, CacheEntry>) {
        let before = entries.len();
        entries.retain(|_, entry| entry.created_at.elapsed() < self.config.ttl);
        let removed = (before - entries.len()) as u64;
        if removed > 0 {
            self.record(|stats| stats.entries_evicted += removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::types::{Principle, Section, SectionSource};

    fn prompt_for(label: &str) -> GeneratedPrompt {
        let sections = Principle::ALL
            .iter()
            .map(|p| Section {
                principle: *p,
                text: label.to_string(),
                source: SectionSource::Fallback,
            })
            .collect();
        GeneratedPrompt::new(sections, label.to_string(), 0.55, vec![])
    }

    fn request(task: &str) -> PromptRequest {
        PromptRequest::new(task).expect("valid task")
    }

    #[test]
    fn test_content_hash_distinguishes_fields() {
        let a = ContentHash::from_request(&request("Plan a trip"));
        let b = ContentHash::from_request(&request("Plan a trip"));
        let c = ContentHash::from_request(&request("Plan a trip").with_constraints(["Cheap"]));
        let d = ContentHash::from_request(&request("Plan a trip").with_examples(false));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ResultCache::new(CacheConfig::new(4));
        let req = request("Plan a trip");

        assert!(cache.get(&req).is_none());
        cache.insert(&req, prompt_for("trip"));

        let cached = cache.get(&req).expect("cached");
        assert_eq!(cached.final_prompt(), "trip");
        assert!(cache.get(&request("Plan a party")).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries_added, 1);
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResultCache::new(CacheConfig::new(2));
        let first = request("first");
        let second = request("second");
        let third = request("third");

        cache.insert(&first, prompt_for("1"));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert(&second, prompt_for("2"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&first).is_some());
        std::thread::sleep(Duration::from_millis(5));
        cache.insert(&third, prompt_for("3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&first).is_some());
        assert!(cache.get(&second).is_none());
        assert!(cache.get(&third).is_some());
        assert_eq!(cache.stats().entries_evicted, 1);
    }

    #[test]
    fn test_expired_entries_not_returned() {
        let cache = ResultCache::new(CacheConfig::new(4).with_ttl(Duration::from_millis(10)));
        let req = request("Plan a trip");

        cache.insert(&req, prompt_for("trip"));
        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.get(&req).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ResultCache::new(CacheConfig::new(0));
        let req = request("Plan a trip");
        cache.insert(&req, prompt_for("trip"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = ResultCache::new(CacheConfig::new(4));
        cache.insert(&request("a"), prompt_for("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
