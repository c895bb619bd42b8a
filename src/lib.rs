//! pincache: bounded, key-addressed object cache with LRU eviction and
//! per-entry pinning.
//!
//! Capacity, entry size, and key size are fixed at construction. Entries are
//! fixed-size byte payloads addressed by opaque fixed-size keys; callers
//! either fetch private copies or pin entries in place through stable
//! handles. Pinned entries are never evicted.
//!
//! ```
//! use pincache::prelude::*;
//!
//! let mut cache = CacheBuilder::new(1024, 64, 8).try_build().unwrap();
//!
//! let key = 7u64.to_le_bytes();
//! cache.insert(&key, &[0u8; 64]).unwrap();
//!
//! let handle = cache.lookup_pin(&key).unwrap();
//! cache.entry_mut(handle).unwrap()[0] = 1;
//! cache.unpin(handle).unwrap();
//! ```

pub mod builder;
pub mod cache;
pub mod concurrent;
pub mod ds;
pub mod error;
pub mod prelude;
pub mod traits;
