//! Resolution cache implementation.

use crate::fingerprint::{Fingerprint, FingerprintScope};
use derive_getters::Getters;
use grimorio_core::{CardId, ResolutionStats, VariableContext};
use serde::{Deserialize, Serialize};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cached resolution with expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    text: String,
    stats: ResolutionStats,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Cache key for resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    card_id: CardId,
    fingerprint: Fingerprint,
}

/// Configuration for the resolution cache.
///
/// ```toml
/// [cache]
/// enabled = true
/// ttl_secs = 300
/// max_entries = 1000
/// fingerprint = "whole_context"
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ResolutionCacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,

    /// TTL for cached entries (seconds)
    #[serde(default = "default_ttl_secs")]
    #[builder(default = "default_ttl_secs()")]
    ttl_secs: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_entries")]
    #[builder(default = "default_max_entries()")]
    max_entries: usize,

    /// Which part of the context keys an entry
    #[serde(default)]
    #[builder(default)]
    fingerprint: FingerprintScope,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_max_entries() -> usize {
    1000
}

impl Default for ResolutionCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            fingerprint: FingerprintScope::default(),
        }
    }
}

impl ResolutionCacheConfig {
    /// Configured TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Snapshot of cache telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Getters)]
pub struct CacheStats {
    /// Live entries, including expired ones not yet swept
    size: usize,
    /// Lookups answered from the cache
    hit_count: u64,
    /// Lookups that found nothing usable
    miss_count: u64,
    /// `hit_count / (hit_count + miss_count)`, or 0 before any lookup
    hit_rate: f64,
}

/// Cache of resolved templates.
///
/// Entries are keyed by card id and a [`Fingerprint`] of what the
/// resolution read. Lookups take `&self`, so one cache is shared between
/// threads; entries live behind an `RwLock` and counters are atomic.
///
/// # Example
///
/// ```
/// use grimorio_cache::{ResolutionCache, ResolutionCacheConfig};
/// use grimorio_core::{CardId, VariableContext};
/// use serde_json::json;
///
/// let cache = ResolutionCache::new(ResolutionCacheConfig::default());
/// let card = CardId::new("c-saludo");
/// let ctx = VariableContext::default().with_npc(json!({"nombre": "Gareth"}));
///
/// assert_eq!(cache.get(&card, &ctx), None);
/// cache.set(&card, &ctx, "Hola Gareth");
/// assert_eq!(cache.get(&card, &ctx).as_deref(), Some("Hola Gareth"));
///
/// let stats = cache.stats();
/// assert_eq!((*stats.hit_count(), *stats.miss_count()), (1, 1));
/// ```
#[derive(Debug)]
pub struct ResolutionCache {
    config: ResolutionCacheConfig,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create a new resolution cache with configuration.
    pub fn new(config: ResolutionCacheConfig) -> Self {
        tracing::debug!(
            enabled = config.enabled,
            ttl_secs = config.ttl_secs,
            max_entries = config.max_entries,
            fingerprint = %config.fingerprint,
            "Creating new ResolutionCache"
        );
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ResolutionCacheConfig {
        &self.config
    }

    /// Look up text cached for `card_id` under a whole-context fingerprint.
    pub fn get(&self, card_id: &CardId, ctx: &VariableContext) -> Option<String> {
        self.get_fingerprinted(card_id, &Fingerprint::of_context(ctx))
            .map(|entry| entry.text)
    }

    /// Cache `text` for `card_id` under a whole-context fingerprint.
    ///
    /// The entry carries empty stats; use
    /// [`insert_fingerprinted`](Self::insert_fingerprinted) to keep the
    /// stats of the resolution that produced the text.
    pub fn set(&self, card_id: &CardId, ctx: &VariableContext, text: impl Into<String>) {
        self.insert_fingerprinted(
            card_id,
            Fingerprint::of_context(ctx),
            text.into(),
            ResolutionStats::new(),
        );
    }

    /// Look up an entry by precomputed fingerprint.
    ///
    /// Returns None if:
    /// - Entry doesn't exist
    /// - Entry is expired (it is removed)
    /// - Cache is disabled (not counted as a miss)
    #[tracing::instrument(skip(self, card_id, fingerprint), fields(card = %card_id))]
    pub fn get_fingerprinted(
        &self,
        card_id: &CardId,
        fingerprint: &Fingerprint,
    ) -> Option<CacheEntry> {
        if !self.config.enabled {
            tracing::trace!("Cache disabled, returning None");
            return None;
        }

        let key = CacheKey {
            card_id: card_id.clone(),
            fingerprint: fingerprint.clone(),
        };

        let found = self.read().get(&key).cloned();
        match found {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
                Some(entry)
            }
            Some(_) => {
                tracing::debug!("Cache entry expired, removing");
                let mut entries = self.write();
                // Another writer may have refreshed it meanwhile
                if entries.get(&key).is_some_and(CacheEntry::is_expired) {
                    entries.remove(&key);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache miss");
                None
            }
        }
    }

    /// Store a resolution under a precomputed fingerprint.
    ///
    /// The stats are kept whole, variable outcomes included, so a hit can
    /// be reported like the resolution that produced it. Replaces any entry with the same key. When the cache is full, the
    /// oldest entry is evicted first.
    #[tracing::instrument(skip(self, card_id, fingerprint, text, stats), fields(card = %card_id))]
    pub fn insert_fingerprinted(
        &self,
        card_id: &CardId,
        fingerprint: Fingerprint,
        text: String,
        stats: ResolutionStats,
    ) {
        if !self.config.enabled {
            tracing::trace!("Cache disabled, skipping insert");
            return;
        }
        if self.config.max_entries == 0 {
            return;
        }

        let key = CacheKey {
            card_id: card_id.clone(),
            fingerprint,
        };
        let entry = CacheEntry {
            text,
            stats,
            created_at: Instant::now(),
            ttl: self.config.ttl(),
        };

        let mut entries = self.write();
        if entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            Self::evict_oldest(&mut entries);
        }
        entries.insert(key, entry);
        tracing::debug!(cache_size = entries.len(), "Inserted entry into cache");
    }

    /// Remove every entry for a card. Returns how many were removed.
    #[tracing::instrument(skip(self, card_id), fields(card = %card_id))]
    pub fn invalidate_card(&self, card_id: &CardId) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| key.card_id != *card_id);
        let removed = before - entries.len();
        tracing::debug!(removed, "Invalidated card entries");
        removed
    }

    /// Clear all cache entries.
    pub fn invalidate_all(&self) {
        let mut entries = self.write();
        let count = entries.len();
        entries.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Remove expired entries from cache.
    pub fn clean_expired(&self) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());

        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!(removed, remaining = entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    /// Current size and cumulative hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        let hit_count = self.hits.load(Ordering::Relaxed);
        let miss_count = self.misses.load(Ordering::Relaxed);
        let total = hit_count + miss_count;
        CacheStats {
            size: self.len(),
            hit_count,
            miss_count,
            hit_rate: if total == 0 {
                0.0
            } else {
                hit_count as f64 / total as f64
            },
        }
    }

    /// Zero the hit/miss counters. Entries are kept.
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        tracing::info!("Reset cache statistics");
    }

    /// Get number of cached entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.write()
    }

    /// Evict the entry created first.
    fn evict_oldest(entries: &mut HashMap<CacheKey, CacheEntry>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            tracing::debug!(card = %key.card_id, "Evicting oldest entry");
            entries.remove(&key);
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(ResolutionCacheConfig::default())
    }
}
