// ==============================================
// END-TO-END CACHE SCENARIOS (integration)
// ==============================================
//
// Exercises the facade across all three internal structures at once: fill
// and overflow, pin-aware eviction, delete/unpin status codes, and the
// LRU ordering laws. Configuration throughout: capacity 4, 4-byte entries,
// 4-byte little-endian keys (so the default key reduction is the identity).

use pincache::prelude::*;

const CAPACITY: usize = 4;

fn key(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

fn val(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

fn new_cache() -> Cache {
    Cache::new(CAPACITY, 4, 4).expect("valid config")
}

fn fill(cache: &mut Cache, keys: impl IntoIterator<Item = u32>) {
    for k in keys {
        cache.insert(&key(k), &val(k)).expect("fill insert");
    }
}

// ==============================================
// Seed scenarios
// ==============================================

#[test]
fn fill_and_overflow_evicts_oldest() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=4);
    cache.insert(&key(5), &val(5)).expect("overflow insert");

    let mut dst = [0u8; 4];
    assert_eq!(
        cache.lookup_copy(&key(1), &mut dst),
        Err(CacheError::NotFound)
    );
    for k in 2..=5 {
        cache.lookup_copy(&key(k), &mut dst).expect("live key");
        assert_eq!(dst, val(k));
    }
    assert_eq!(cache.len(), CAPACITY);
    cache.debug_validate_invariants();
}

#[test]
fn pin_prevents_eviction_of_lru_entry() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=4);

    let pinned = cache.lookup_pin(&key(1)).expect("pin key 1");
    cache.insert(&key(5), &val(5)).expect("insert with pin held");

    // Key 1 was promoted and pinned; key 2 was the LRU among unpinned.
    let mut dst = [0u8; 4];
    assert_eq!(
        cache.lookup_copy(&key(2), &mut dst),
        Err(CacheError::NotFound)
    );
    assert_eq!(cache.entry(pinned), Some(&val(1)[..]));
    cache.unpin(pinned).expect("unpin key 1");
    cache.debug_validate_invariants();
}

#[test]
fn add_fails_when_every_entry_is_pinned() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=4);
    let handles: Vec<_> = (1..=4)
        .map(|k| cache.lookup_pin(&key(k)).expect("pin"))
        .collect();

    assert_eq!(cache.insert(&key(5), &val(5)), Err(CacheError::Full));

    // No state change: all four entries still live and pinned once.
    assert_eq!(cache.len(), CAPACITY);
    let mut dst = [0u8; 4];
    for (i, handle) in handles.iter().enumerate() {
        let k = i as u32 + 1;
        cache.lookup_copy(&key(k), &mut dst).expect("still live");
        assert_eq!(cache.pin_count(*handle), Some(1));
    }
    cache.debug_validate_invariants();
}

#[test]
fn delete_unpinned_versus_locked() {
    let mut cache = new_cache();
    cache.insert(&key(1), &val(1)).expect("insert");
    cache.remove(&key(1)).expect("unpinned delete succeeds");

    cache.insert(&key(1), &val(1)).expect("re-insert");
    let pinned = cache.lookup_pin(&key(1)).expect("pin");
    assert_eq!(cache.remove(&key(1)), Err(CacheError::Locked));
    cache.unpin(pinned).expect("unpin");
    cache.remove(&key(1)).expect("delete after unpin");
    assert!(cache.is_empty());
    cache.debug_validate_invariants();
}

#[test]
fn unpaired_unpin_is_diagnosed() {
    let mut cache = new_cache();
    // Insert with a source payload: the entry comes back unpinned.
    let handle = cache.insert(&key(1), &val(1)).expect("insert");
    assert_eq!(cache.unpin(handle), Err(CacheError::AlreadyUnlocked));
}

#[test]
fn duplicate_add_preserves_first_payload() {
    let mut cache = new_cache();
    cache.insert(&key(1), &[0xAA; 4]).expect("first insert");
    assert_eq!(cache.insert(&key(1), &[0xBB; 4]), Err(CacheError::Duplicate));

    let mut dst = [0u8; 4];
    cache.lookup_copy(&key(1), &mut dst).expect("hit");
    assert_eq!(dst, [0xAA; 4]);
    cache.debug_validate_invariants();
}

// ==============================================
// Laws
// ==============================================

#[test]
fn missing_key_lookup_is_idempotent() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=3);

    let mut dst = [0u8; 4];
    for _ in 0..3 {
        assert_eq!(
            cache.lookup_copy(&key(9), &mut dst),
            Err(CacheError::NotFound)
        );
        assert_eq!(cache.len(), 3);
    }
    // The misses did not disturb recency: key 1 is still the LRU.
    fill(&mut cache, 4..=5);
    assert_eq!(
        cache.lookup_copy(&key(1), &mut dst),
        Err(CacheError::NotFound)
    );
    cache.debug_validate_invariants();
}

#[test]
fn add_then_lookup_round_trips_bytes() {
    let mut cache = new_cache();
    let src = [0xDE, 0xAD, 0xBE, 0xEF];
    cache.insert(&key(1), &src).expect("insert");

    let mut dst = [0u8; 4];
    cache.lookup_copy(&key(1), &mut dst).expect("hit");
    assert_eq!(dst, src);
}

#[test]
fn promotion_changes_the_eviction_victim() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=4);

    // Promote key 1 without pinning it.
    let promoted = cache.lookup_pin(&key(1)).expect("promote");
    cache.unpin(promoted).expect("release immediately");

    // The next overflow evicts key 2, the current tail, not key 1.
    cache.insert(&key(5), &val(5)).expect("overflow");
    let mut dst = [0u8; 4];
    cache.lookup_copy(&key(1), &mut dst).expect("key 1 survives");
    assert_eq!(
        cache.lookup_copy(&key(2), &mut dst),
        Err(CacheError::NotFound)
    );
    cache.debug_validate_invariants();
}

// ==============================================
// Handle-based paths
// ==============================================

#[test]
fn reserve_write_unpin_read_back() {
    let mut cache = new_cache();
    let handle = cache.reserve(&key(1)).expect("reserve");
    assert_eq!(cache.pin_count(handle), Some(1));

    cache
        .entry_mut(handle)
        .expect("live handle")
        .copy_from_slice(&val(41));
    cache.unpin(handle).expect("unpin");

    let mut dst = [0u8; 4];
    cache.lookup_copy(&key(1), &mut dst).expect("hit");
    assert_eq!(dst, val(41));
}

#[test]
fn delete_entry_by_handle_matches_delete_by_key() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=2);

    let handle = cache.lookup_pin(&key(2)).expect("pin");
    assert_eq!(cache.remove_entry(handle), Err(CacheError::Locked));
    cache.unpin(handle).expect("unpin");
    cache.remove_entry(handle).expect("delete by handle");

    let mut dst = [0u8; 4];
    assert_eq!(
        cache.lookup_copy(&key(2), &mut dst),
        Err(CacheError::NotFound)
    );
    assert_eq!(cache.remove_entry(handle), Err(CacheError::NotFound));
    cache.debug_validate_invariants();
}

#[test]
fn clean_discards_pinned_entries_too() {
    let mut cache = new_cache();
    fill(&mut cache, 1..=4);
    let pinned = cache.lookup_pin(&key(3)).expect("pin");

    cache.clean();
    assert!(cache.is_empty());
    assert_eq!(cache.entry(pinned), None);

    // Full capacity is available again.
    fill(&mut cache, 10..=13);
    assert_eq!(cache.len(), CAPACITY);
    cache.debug_validate_invariants();
}

// ==============================================
// Evict callback across removal paths
// ==============================================

#[test]
fn evict_callback_observes_every_departure() {
    use std::sync::{Arc, Mutex};

    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut cache = CacheBuilder::new(CAPACITY, 4, 4)
        .on_evict(move |key, _payload| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(key);
            sink.lock().unwrap().push(u32::from_le_bytes(raw));
        })
        .try_build()
        .expect("valid config");

    fill(&mut cache, 1..=4);
    cache.insert(&key(5), &val(5)).expect("evicts key 1");
    cache.remove(&key(3)).expect("explicit removal");
    cache.clean();

    let events = seen.lock().unwrap().clone();
    // Eviction, removal, then clean draining MRU-first: 5, 4, 2.
    assert_eq!(events, vec![1, 3, 5, 4, 2]);
}
