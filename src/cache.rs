//! Cache facade coordinating the arena, hash index, and recency list.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                            Cache<O: KeyOps>                         │
//!   │                                                                     │
//!   │   key bytes                                                         │
//!   │      │                                                              │
//!   │      ▼                                                              │
//!   │   ┌───────────────────────────┐      ┌───────────────────────────┐  │
//!   │   │ HashIndex<O>              │      │ LinkedList<EntryMeta>     │  │
//!   │   │ bucket chains of          │─────►│ MRU ──► ... ──► LRU       │  │
//!   │   │ { key copy, owner }       │owner │ { key copy, slot,         │  │
//!   │   └───────────────────────────┘      │   hash_node, pins }       │  │
//!   │                 ▲                    └─────────────┬─────────────┘  │
//!   │                 │ hash_node                        │ slot           │
//!   │                 │                                  ▼                │
//!   │                 │                    ┌───────────────────────────┐  │
//!   │                 └────────────────────│ ByteArena                 │  │
//!   │                         back_ref     │ payload slots + reserved  │  │
//!   │                                      │ back-reference words      │  │
//!   │                                      └───────────────────────────┘  │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every live entry is threaded through all three structures at once: the
//! hash index resolves key bytes to the recency node, the recency node names
//! the arena slot holding the payload, and the slot's back-reference word
//! points back at the recency node so an [`EntryHandle`] can be resolved to
//! its metadata in O(1).
//!
//! ## Operations
//!
//! | Operation       | Recency effect | Pin effect        |
//! |-----------------|----------------|-------------------|
//! | `lookup_copy`   | promote to MRU | none              |
//! | `lookup_pin`    | promote to MRU | `pins += 1`       |
//! | `insert`        | push at MRU    | none              |
//! | `reserve`       | push at MRU    | starts at 1       |
//! | `remove`        | unlink         | refused if pinned |
//! | `remove_entry`  | unlink         | refused if pinned |
//! | `unpin`         | none           | `pins -= 1`       |
//! | `clean`         | drain          | ignored           |
//!
//! Eviction picks the tail-most entry with a zero pin count; when every
//! entry is pinned, insertion fails with [`CacheError::Full`] and nothing
//! changes.
//!
//! ## Thread safety
//!
//! `Cache` performs no internal synchronization; each method is one bounded
//! critical section. [`ConcurrentCache`](crate::concurrent::ConcurrentCache)
//! serializes them behind a `parking_lot::Mutex` for shared use.

use tracing::{debug, trace};

use crate::builder::CacheBuilder;
use crate::ds::byte_arena::{ByteArena, SlotIndex};
use crate::ds::hash_index::HashIndex;
use crate::ds::linked_list::{LinkedList, NodeId};
use crate::error::{CacheError, ConfigError};
use crate::traits::{BytewiseKeys, EvictCallback, KeyOps};

/// Opaque handle to a live cache entry's payload slot.
///
/// Returned by the pinning operations ([`Cache::lookup_pin`],
/// [`Cache::reserve`]) and by [`Cache::insert`]. A handle stays valid while
/// the entry it names is live; holding a pin guarantees that. Payload bytes
/// are read and written through [`Cache::entry`] / [`Cache::entry_mut`],
/// which reject stale handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(pub(crate) SlotIndex);

/// Per-entry metadata threaded through the recency list.
#[derive(Debug)]
struct EntryMeta {
    key: Box<[u8]>,
    slot: SlotIndex,
    hash_node: Option<NodeId>,
    pins: u32,
}

/// Bounded, key-addressed object cache with LRU eviction and pinning.
pub struct Cache<O: KeyOps = BytewiseKeys> {
    arena: ByteArena,
    index: HashIndex<O>,
    recency: LinkedList<EntryMeta>,
    capacity: usize,
    entry_size: usize,
    key_size: usize,
    on_evict: Option<EvictCallback>,
}

impl<O: KeyOps + std::fmt::Debug> std::fmt::Debug for Cache<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("arena", &self.arena)
            .field("index", &self.index)
            .field("recency", &self.recency)
            .field("capacity", &self.capacity)
            .field("entry_size", &self.entry_size)
            .field("key_size", &self.key_size)
            .field("on_evict", &self.on_evict.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Cache<BytewiseKeys> {
    /// Creates a cache with [`BytewiseKeys`] and no evict callback.
    ///
    /// Shorthand for `CacheBuilder::new(..).try_build()`.
    pub fn new(capacity: usize, entry_size: usize, key_size: usize) -> Result<Self, ConfigError> {
        CacheBuilder::new(capacity, entry_size, key_size).try_build()
    }
}

impl<O: KeyOps> Cache<O> {
    pub(crate) fn from_parts(
        capacity: usize,
        entry_size: usize,
        key_size: usize,
        key_ops: O,
        on_evict: Option<EvictCallback>,
    ) -> Self {
        debug!(capacity, entry_size, key_size, "cache created");
        Self {
            arena: ByteArena::new(capacity, entry_size),
            index: HashIndex::new(capacity, key_size, key_ops),
            recency: LinkedList::with_capacity(capacity),
            capacity,
            entry_size,
            key_size,
            on_evict,
        }
    }

    /// Copies the entry for `key` into `dst` and promotes it to MRU.
    ///
    /// Does not pin. `dst` must be exactly `entry_size` bytes.
    pub fn lookup_copy(&mut self, key: &[u8], dst: &mut [u8]) -> Result<(), CacheError> {
        self.check_key(key)?;
        self.check_payload(dst)?;
        let found = self.index.find(key).ok_or(CacheError::NotFound)?;
        let slot = self
            .recency
            .get(found.owner)
            .expect("index points at missing recency node")
            .slot;
        dst.copy_from_slice(self.arena.payload(slot));
        self.recency.move_to_front(found.owner);
        Ok(())
    }

    /// Pins the entry for `key`, promotes it to MRU, and returns its handle.
    ///
    /// The entry cannot be evicted or removed until every pin is released
    /// with [`unpin`](Self::unpin); pins stack.
    ///
    /// # Panics
    ///
    /// Panics if the entry's pin count would overflow `u32`.
    pub fn lookup_pin(&mut self, key: &[u8]) -> Result<EntryHandle, CacheError> {
        self.check_key(key)?;
        let found = self.index.find(key).ok_or(CacheError::NotFound)?;
        let meta = self
            .recency
            .get_mut(found.owner)
            .expect("index points at missing recency node");
        meta.pins = meta.pins.checked_add(1).expect("pin counter overflow");
        let slot = meta.slot;
        self.recency.move_to_front(found.owner);
        Ok(EntryHandle(slot))
    }

    /// Adds an entry for `key` with payload bytes copied from `src`.
    ///
    /// The new entry lands at MRU, unpinned. `src` must be exactly
    /// `entry_size` bytes. When the cache is full, the tail-most unpinned
    /// entry is evicted first.
    pub fn insert(&mut self, key: &[u8], src: &[u8]) -> Result<EntryHandle, CacheError> {
        self.check_payload(src)?;
        self.insert_inner(key, Some(src))
    }

    /// Adds an entry for `key` without writing its payload, returning a
    /// pinned handle for the caller to fill through
    /// [`entry_mut`](Self::entry_mut).
    ///
    /// The slot's bytes are whatever the backing region last held; the
    /// caller is expected to write them before unpinning.
    pub fn reserve(&mut self, key: &[u8]) -> Result<EntryHandle, CacheError> {
        self.insert_inner(key, None)
    }

    fn insert_inner(&mut self, key: &[u8], src: Option<&[u8]>) -> Result<EntryHandle, CacheError> {
        self.check_key(key)?;
        if self.index.find(key).is_some() {
            trace!("insert rejected, key already present");
            return Err(CacheError::Duplicate);
        }

        let (slot, mut key_buf) = if self.recency.len() < self.capacity {
            let slot = self.arena.acquire().map_err(|_| CacheError::Full)?;
            (slot, vec![0u8; self.key_size].into_boxed_slice())
        } else {
            let victim = match self.recency.rfind(|meta| meta.pins == 0) {
                Some(victim) => victim,
                None => {
                    debug!("cache full and every entry pinned, insert refused");
                    return Err(CacheError::Full);
                }
            };
            let meta = self.recency.remove(victim).expect("victim node missing");
            let hash_node = meta.hash_node.expect("victim hash link missing");
            self.index.remove(&meta.key, hash_node);
            self.notify_evict(&meta.key, meta.slot);
            trace!("evicted lru entry to reuse its slot");
            let mut key_buf = meta.key;
            key_buf.fill(0);
            (meta.slot, key_buf)
        };

        key_buf.copy_from_slice(key);
        if let Some(src) = src {
            self.arena.payload_mut(slot).copy_from_slice(src);
        }

        let pins = if src.is_none() { 1 } else { 0 };
        let node = self.recency.push_front(EntryMeta {
            key: key_buf,
            slot,
            hash_node: None,
            pins,
        });

        if self.arena.set_back_ref(slot, node).is_err() {
            // Roll back the partially constructed entry; nothing reached the
            // hash index yet.
            self.recency.pop_front();
            let _ = self.arena.release(slot);
            return Err(CacheError::InvalidArgument);
        }

        let hash_node = self.index.insert(key, node);
        self.recency
            .get_mut(node)
            .expect("new recency node missing")
            .hash_node = Some(hash_node);

        Ok(EntryHandle(slot))
    }

    /// Removes the entry for `key` from all three structures.
    ///
    /// Fails with [`CacheError::Locked`] while the entry is pinned. The
    /// evict callback observes the entry before its slot is released.
    pub fn remove(&mut self, key: &[u8]) -> Result<(), CacheError> {
        self.check_key(key)?;
        let found = self.index.find(key).ok_or(CacheError::NotFound)?;
        let pins = self
            .recency
            .get(found.owner)
            .expect("index points at missing recency node")
            .pins;
        if pins > 0 {
            return Err(CacheError::Locked);
        }

        let meta = self
            .recency
            .remove(found.owner)
            .expect("owner node missing");
        let hash_node = meta.hash_node.expect("hash link missing");
        self.index.remove(&meta.key, hash_node);
        self.notify_evict(&meta.key, meta.slot);
        self.arena
            .release(meta.slot)
            .expect("live entry slot not owned by arena");
        Ok(())
    }

    /// Removes the entry a handle points at, resolving it through the
    /// arena's back-reference.
    ///
    /// `NotFound` when the handle's slot is free (stale handle); `Locked`
    /// while the entry is pinned.
    pub fn remove_entry(&mut self, handle: EntryHandle) -> Result<(), CacheError> {
        let node = self.arena.back_ref(handle.0).ok_or(CacheError::NotFound)?;
        let meta = self.recency.get(node).expect("back-ref points at missing node");
        if meta.pins > 0 {
            return Err(CacheError::Locked);
        }
        let key = meta.key.clone();
        self.remove(&key)
    }

    /// Releases one pin on the entry a handle points at.
    ///
    /// `AlreadyUnlocked` reports an unpaired unpin: the entry exists but its
    /// pin count is already zero.
    pub fn unpin(&mut self, handle: EntryHandle) -> Result<(), CacheError> {
        let node = self.arena.back_ref(handle.0).ok_or(CacheError::NotFound)?;
        let meta = self
            .recency
            .get_mut(node)
            .expect("back-ref points at missing node");
        if meta.pins == 0 {
            debug!("unpaired unpin detected");
            return Err(CacheError::AlreadyUnlocked);
        }
        meta.pins -= 1;
        Ok(())
    }

    /// Forcefully empties the cache, ignoring pin counts.
    ///
    /// Every entry is handed to the evict callback and its slot released.
    /// Callers must ensure no pinned handles are outstanding; any handle
    /// held across `clean` is stale afterwards.
    pub fn clean(&mut self) {
        while let Some(meta) = self.recency.pop_front() {
            self.notify_evict(&meta.key, meta.slot);
            self.arena
                .release(meta.slot)
                .expect("live entry slot not owned by arena");
        }
        self.index.clear();
    }

    /// Returns the payload bytes for a handle, or `None` if it is stale.
    pub fn entry(&self, handle: EntryHandle) -> Option<&[u8]> {
        self.arena.back_ref(handle.0)?;
        Some(self.arena.payload(handle.0))
    }

    /// Returns the mutable payload bytes for a handle, or `None` if it is
    /// stale.
    pub fn entry_mut(&mut self, handle: EntryHandle) -> Option<&mut [u8]> {
        self.arena.back_ref(handle.0)?;
        Some(self.arena.payload_mut(handle.0))
    }

    /// Returns the pin count of the entry a handle points at.
    pub fn pin_count(&self, handle: EntryHandle) -> Option<u32> {
        let node = self.arena.back_ref(handle.0)?;
        Some(
            self.recency
                .get(node)
                .expect("back-ref points at missing node")
                .pins,
        )
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the fixed maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured payload size in bytes.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Returns the configured key size in bytes.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    fn check_key(&self, key: &[u8]) -> Result<(), CacheError> {
        if key.len() != self.key_size {
            return Err(CacheError::InvalidArgument);
        }
        Ok(())
    }

    fn check_payload(&self, payload: &[u8]) -> Result<(), CacheError> {
        if payload.len() != self.entry_size {
            return Err(CacheError::InvalidArgument);
        }
        Ok(())
    }

    fn notify_evict(&mut self, key: &[u8], slot: SlotIndex) {
        if let Some(callback) = self.on_evict.as_mut() {
            callback(key, self.arena.payload(slot));
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.recency.len(), self.index.len());
        assert_eq!(self.recency.len(), self.arena.len());
        assert!(self.recency.len() <= self.capacity);
        self.recency.debug_validate_invariants();
        self.index.debug_validate_invariants();
        self.arena.debug_validate_invariants();

        let mut keys = std::collections::HashSet::new();
        for node in self.recency.ids() {
            let meta = self.recency.get(node).expect("recency node missing");
            assert_eq!(meta.key.len(), self.key_size);
            assert_eq!(self.arena.back_ref(meta.slot), Some(node));
            let found = self.index.find(&meta.key).expect("key missing from index");
            assert_eq!(found.owner, node);
            assert_eq!(Some(found.node), meta.hash_node);
            assert!(keys.insert(meta.key.to_vec()), "duplicate live key");
        }
    }
}

impl<O: KeyOps> Drop for Cache<O> {
    /// Destroys the cache: every remaining entry is handed to the evict
    /// callback, then the backing structures are released.
    fn drop(&mut self) {
        self.clean();
    }
}
