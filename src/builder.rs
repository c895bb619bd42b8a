//! Cache construction with parameter validation.
//!
//! All capacity and sizing parameters are fixed at build time; the builder
//! validates them once and the rest of the crate treats them as trusted.
//!
//! ## Example
//!
//! ```
//! use pincache::builder::CacheBuilder;
//!
//! let mut cache = CacheBuilder::new(128, 64, 8)
//!     .on_evict(|key, _payload| {
//!         let _ = key; // release payload-internal resources here
//!     })
//!     .try_build()
//!     .unwrap();
//!
//! cache.insert(&[0u8; 8], &[0u8; 64]).unwrap();
//! assert_eq!(cache.len(), 1);
//! ```

use crate::cache::Cache;
use crate::error::ConfigError;
use crate::traits::{BytewiseKeys, EvictCallback, KeyOps};

/// Largest supported entry capacity.
pub const MAX_ENTRY_COUNT: usize = 1 << 31;

/// Builder for [`Cache`] instances.
pub struct CacheBuilder<O: KeyOps = BytewiseKeys> {
    capacity: usize,
    entry_size: usize,
    key_size: usize,
    key_ops: O,
    on_evict: Option<EvictCallback>,
}

impl CacheBuilder<BytewiseKeys> {
    /// Starts a builder for a cache of `capacity` entries of `entry_size`
    /// payload bytes addressed by `key_size`-byte keys.
    pub fn new(capacity: usize, entry_size: usize, key_size: usize) -> Self {
        Self {
            capacity,
            entry_size,
            key_size,
            key_ops: BytewiseKeys,
            on_evict: None,
        }
    }
}

impl<O: KeyOps> CacheBuilder<O> {
    /// Replaces the key comparison and hashing behavior.
    pub fn key_ops<P: KeyOps>(self, key_ops: P) -> CacheBuilder<P> {
        CacheBuilder {
            capacity: self.capacity,
            entry_size: self.entry_size,
            key_size: self.key_size,
            key_ops,
            on_evict: self.on_evict,
        }
    }

    /// Installs a callback invoked with `(key, payload)` whenever a live
    /// entry leaves the cache (eviction, removal, `clean`, drop).
    pub fn on_evict(mut self, callback: impl FnMut(&[u8], &[u8]) + Send + 'static) -> Self {
        self.on_evict = Some(Box::new(callback));
        self
    }

    /// Validates the configuration and builds the cache.
    pub fn try_build(self) -> Result<Cache<O>, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("max_entries must be greater than zero"));
        }
        if self.capacity > MAX_ENTRY_COUNT {
            return Err(ConfigError::new(format!(
                "max_entries must be at most {MAX_ENTRY_COUNT}"
            )));
        }
        if self.entry_size == 0 {
            return Err(ConfigError::new("entry_size must be greater than zero"));
        }
        if self.key_size == 0 {
            return Err(ConfigError::new("key_size must be greater than zero"));
        }
        Ok(Cache::from_parts(
            self.capacity,
            self.entry_size,
            self.key_size,
            self.key_ops,
            self.on_evict,
        ))
    }
}
