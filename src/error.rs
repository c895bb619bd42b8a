//! Error types for the pincache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Immediate status returned by every cache operation;
//!   nothing is retried internally and there is no global error state.
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (zero capacity, zero sizes, capacity above the supported maximum).
//!
//! ## Example Usage
//!
//! ```
//! use pincache::builder::CacheBuilder;
//! use pincache::error::{CacheError, ConfigError};
//!
//! // Fallible constructor for user-configurable parameters
//! let cache = CacheBuilder::new(16, 8, 4).try_build();
//! assert!(cache.is_ok());
//!
//! // Invalid capacity is caught without panicking
//! let bad: Result<_, ConfigError> = CacheBuilder::new(0, 8, 4).try_build();
//! assert!(bad.is_err());
//!
//! // Operations report status through CacheError
//! let mut cache = CacheBuilder::new(16, 8, 4).try_build().unwrap();
//! let mut dst = [0u8; 8];
//! assert_eq!(
//!     cache.lookup_copy(&[0, 0, 0, 0], &mut dst),
//!     Err(CacheError::NotFound)
//! );
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Status returned by cache operations.
///
/// Each operation reports exactly one of these and leaves the cache in a
/// consistent state; a failed insertion rolls back any partial construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// A key or payload slice does not match the configured size.
    InvalidArgument,
    /// The key (or entry handle) does not resolve to a live entry.
    NotFound,
    /// The target entry is pinned; mutation refused.
    Locked,
    /// `unpin` was called on an entry whose pin count is already zero,
    /// indicating unpaired pin/unpin usage.
    AlreadyUnlocked,
    /// The cache is full and every live entry is pinned.
    Full,
    /// An entry with the same key already exists.
    Duplicate,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CacheError::InvalidArgument => "argument does not match configured size",
            CacheError::NotFound => "no live entry for key or handle",
            CacheError::Locked => "entry is pinned",
            CacheError::AlreadyUnlocked => "entry pin count is already zero",
            CacheError::Full => "cache is full and every entry is pinned",
            CacheError::Duplicate => "an entry with this key already exists",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
