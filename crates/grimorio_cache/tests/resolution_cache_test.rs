//! Expiry and concurrency behavior of the resolution cache.

use grimorio_cache::{Fingerprint, ResolutionCache, ResolutionCacheConfig};
use grimorio_core::{CardId, ResolutionStats, VariableContext};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn ctx() -> VariableContext {
    VariableContext::default()
        .with_npc(json!({"nombre": "Gareth"}))
        .with_player(json!({"hora": "10:30pm"}))
}

#[test]
fn test_entries_expire_after_ttl() {
    let cache = ResolutionCache::new(ResolutionCacheConfig::default().with_ttl_secs(1));
    let card = CardId::new("c-saludo");
    cache.set(&card, &ctx(), "Hola Gareth");

    let fingerprint = Fingerprint::of_context(&ctx());
    let entry = cache.get_fingerprinted(&card, &fingerprint).unwrap();
    assert!(!entry.is_expired());
    assert!(entry.time_remaining().is_some());

    thread::sleep(Duration::from_millis(1100));

    assert_eq!(cache.get(&card, &ctx()), None);
    // Expired entries found by a lookup are dropped
    assert!(cache.is_empty());
}

#[test]
fn test_clean_expired_counts_removed_entries() {
    let cache = ResolutionCache::new(ResolutionCacheConfig::default().with_ttl_secs(0));
    for i in 0..3 {
        cache.set(&CardId::new(format!("c-{i}")), &ctx(), "texto");
    }
    assert_eq!(cache.len(), 3);

    thread::sleep(Duration::from_millis(10));

    assert_eq!(cache.clean_expired(), 3);
    assert!(cache.is_empty());
    assert_eq!(cache.clean_expired(), 0);
}

#[test]
fn test_invalidation_is_visible_to_next_get() {
    let cache = ResolutionCache::default();
    let card = CardId::new("c-saludo");
    cache.set(&card, &ctx(), "Hola Gareth");
    assert!(cache.get(&card, &ctx()).is_some());

    cache.invalidate_card(&card);
    assert_eq!(cache.get(&card, &ctx()), None);

    cache.set(&card, &ctx(), "Hola Gareth");
    cache.invalidate_all();
    assert_eq!(cache.get(&card, &ctx()), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let cache = Arc::new(ResolutionCache::default());
    let fingerprint = Fingerprint::of_context(&ctx());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let fingerprint = fingerprint.clone();
            thread::spawn(move || {
                let card = CardId::new(format!("c-{}", worker % 4));
                for _ in 0..100 {
                    match cache.get_fingerprinted(&card, &fingerprint) {
                        Some(entry) => assert_eq!(entry.text(), card.as_str()),
                        None => cache.insert_fingerprinted(
                            &card,
                            fingerprint.clone(),
                            card.as_str().to_string(),
                            ResolutionStats::new(),
                        ),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(*stats.size(), 4);
    assert_eq!(stats.hit_count() + stats.miss_count(), 800);
    assert!(*stats.miss_count() >= 4);
}
