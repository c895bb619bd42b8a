pub mod byte_arena;
pub mod hash_index;
pub mod linked_list;

pub use byte_arena::{ArenaError, ByteArena, SlotIndex};
pub use hash_index::{Found, HashIndex};
pub use linked_list::{LinkedList, NodeId};
