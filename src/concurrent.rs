//! Thread-safe wrapper serializing whole cache operations.
//!
//! [`Cache`](crate::cache::Cache) performs no internal synchronization; each
//! of its methods is one critical section that must run as a unit (hash
//! probe, pin mutation, and recency splice together). `ConcurrentCache`
//! wraps the facade in a `parking_lot::Mutex` and takes the lock for exactly
//! one operation per call, so the single-threaded semantics carry over
//! unchanged.
//!
//! Payload access goes through [`with_entry`](ConcurrentCache::with_entry) /
//! [`with_entry_mut`](ConcurrentCache::with_entry_mut) closures because a
//! borrow of the payload bytes cannot outlive the lock guard.

use parking_lot::Mutex;

use crate::cache::{Cache, EntryHandle};
use crate::error::CacheError;
use crate::traits::{BytewiseKeys, KeyOps};

/// Mutex-guarded [`Cache`] for shared use across threads.
pub struct ConcurrentCache<O: KeyOps = BytewiseKeys> {
    inner: Mutex<Cache<O>>,
}

impl<O: KeyOps + Send> ConcurrentCache<O> {
    /// Wraps an already-built cache.
    pub fn new(cache: Cache<O>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Copies the entry for `key` into `dst`; see [`Cache::lookup_copy`].
    pub fn lookup_copy(&self, key: &[u8], dst: &mut [u8]) -> Result<(), CacheError> {
        self.inner.lock().lookup_copy(key, dst)
    }

    /// Pins the entry for `key`; see [`Cache::lookup_pin`].
    pub fn lookup_pin(&self, key: &[u8]) -> Result<EntryHandle, CacheError> {
        self.inner.lock().lookup_pin(key)
    }

    /// Adds an entry with payload copied from `src`; see [`Cache::insert`].
    pub fn insert(&self, key: &[u8], src: &[u8]) -> Result<EntryHandle, CacheError> {
        self.inner.lock().insert(key, src)
    }

    /// Adds a pinned, unwritten entry; see [`Cache::reserve`].
    pub fn reserve(&self, key: &[u8]) -> Result<EntryHandle, CacheError> {
        self.inner.lock().reserve(key)
    }

    /// Removes the entry for `key`; see [`Cache::remove`].
    pub fn remove(&self, key: &[u8]) -> Result<(), CacheError> {
        self.inner.lock().remove(key)
    }

    /// Removes the entry behind a handle; see [`Cache::remove_entry`].
    pub fn remove_entry(&self, handle: EntryHandle) -> Result<(), CacheError> {
        self.inner.lock().remove_entry(handle)
    }

    /// Releases one pin; see [`Cache::unpin`].
    pub fn unpin(&self, handle: EntryHandle) -> Result<(), CacheError> {
        self.inner.lock().unpin(handle)
    }

    /// Forcefully empties the cache; see [`Cache::clean`].
    pub fn clean(&self) {
        self.inner.lock().clean()
    }

    /// Runs `f` on the payload bytes of a live handle.
    pub fn with_entry<R>(&self, handle: EntryHandle, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let cache = self.inner.lock();
        cache.entry(handle).map(f)
    }

    /// Runs `f` on the mutable payload bytes of a live handle.
    pub fn with_entry_mut<R>(
        &self,
        handle: EntryHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.entry_mut(handle).map(f)
    }

    /// Returns the pin count for a live handle.
    pub fn pin_count(&self, handle: EntryHandle) -> Option<u32> {
        self.inner.lock().pin_count(handle)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the fixed maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<O: KeyOps + Send> From<Cache<O>> for ConcurrentCache<O> {
    fn from(cache: Cache<O>) -> Self {
        Self::new(cache)
    }
}
