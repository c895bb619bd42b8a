pub use crate::builder::CacheBuilder;
pub use crate::cache::{Cache, EntryHandle};
pub use crate::concurrent::ConcurrentCache;
pub use crate::ds::{ArenaError, ByteArena, Found, HashIndex, LinkedList, NodeId, SlotIndex};
pub use crate::error::{CacheError, ConfigError};
pub use crate::traits::{BytewiseKeys, EvictCallback, KeyOps};
