// src/cache/tests/lru_tests.rs

use crate::cache::{cache_hit_rate, CacheOp, LruCache};

#[test]
fn test_zero_capacity_is_rejected() {
    assert!(
        LruCache::<u32>::new(0).is_err(),
        "Capacity 0 should fail at construction"
    );
}

#[test]
fn test_get_promotes_and_put_evicts_lru() {
    // Capacity 2: put(a), put(b), get(a), put(c) -> b evicted
    let mut cache = LruCache::new(2).unwrap();
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);

    assert_eq!(cache.get("a"), Some(&1));

    let evicted = cache.put("c".to_string(), 3);
    assert_eq!(evicted.as_deref(), Some("b"), "LRU key should be evicted");

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_never_exceeds_capacity() {
    let mut cache = LruCache::new(3).unwrap();
    for i in 0..20 {
        cache.put(format!("key-{}", i), i);
        assert!(cache.len() <= 3, "Cache grew past its capacity");
    }

    // The last three inserted keys survive
    assert!(cache.contains("key-17"));
    assert!(cache.contains("key-18"));
    assert!(cache.contains("key-19"));
}

#[test]
fn test_overwrite_does_not_evict() {
    let mut cache = LruCache::new(2).unwrap();
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);

    // Updating an existing key at capacity must not push anything out
    let evicted = cache.put("a".to_string(), 10);
    assert!(evicted.is_none(), "Overwrite should never evict");
    assert_eq!(cache.get("a"), Some(&10));
    assert!(cache.contains("b"));
}

#[test]
fn test_overwrite_marks_most_recently_used() {
    let mut cache = LruCache::new(2).unwrap();
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);

    // "a" becomes MRU again, so the next insert evicts "b"
    cache.put("a".to_string(), 3);
    let evicted = cache.put("c".to_string(), 4);
    assert_eq!(evicted.as_deref(), Some("b"));
    assert_eq!(cache.get("a"), Some(&3));
}

#[test]
fn test_contains_does_not_touch_recency() {
    let mut cache = LruCache::new(2).unwrap();
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);

    // contains() must not promote "a"
    assert!(cache.contains("a"));
    let evicted = cache.put("c".to_string(), 3);
    assert_eq!(
        evicted.as_deref(),
        Some("a"),
        "contains() should leave eviction order unchanged"
    );
}

#[test]
fn test_miss_has_no_side_effect() {
    let mut cache = LruCache::new(2).unwrap();
    cache.put("a".to_string(), 1);

    assert_eq!(cache.get("missing"), None);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("a"));
}

#[test]
fn test_slot_reuse_after_eviction() {
    // Cycle far more keys than capacity to exercise the free list
    let mut cache = LruCache::new(2).unwrap();
    for round in 0..50 {
        cache.put(format!("k{}", round), round);
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("k49"), Some(&49));
    assert_eq!(cache.get("k48"), Some(&48));
}

#[test]
fn test_cache_hit_rate_over_trace() {
    let ops = vec![
        CacheOp::Put {
            key: "x".to_string(),
            value: 1,
        },
        CacheOp::Get {
            key: "x".to_string(),
        },
        CacheOp::Get {
            key: "y".to_string(),
        },
    ];

    // One hit out of two gets
    let rate = cache_hit_rate(&ops);
    assert!((rate - 50.0).abs() < f64::EPSILON);
}

#[test]
fn test_cache_hit_rate_without_gets() {
    let ops: Vec<CacheOp<u32>> = vec![CacheOp::Put {
        key: "x".to_string(),
        value: 1,
    }];
    assert_eq!(cache_hit_rate(&ops), 0.0);
}
