//! Consistent hash ring with virtual nodes and data migration hooks.
//!
//! This crate assigns keys to members of a dynamic cluster so that:
//! - the mapping is deterministic and load-balanced,
//! - adding or removing a node remaps only a bounded fraction of keys,
//! - members that opt in can hand off exactly the data that logically
//!   moved during a topology change.
//!
//! It is a building block for sharded caches, partitioned stores, and
//! request routers. The ring holds no payload data itself; storage and
//! transport stay with the caller.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use carousel::{HashRing, MemoryNode, Node};
//!
//! fn main() -> carousel::Result<()> {
//!     let ring: HashRing<MemoryNode> = HashRing::new();
//!     ring.add_node(Arc::new(MemoryNode::new("cache-a")))?;
//!     ring.add_node(Arc::new(MemoryNode::new("cache-b")))?;
//!
//!     // Deterministic placement: a key always resolves to the same node
//!     // for a fixed ring state.
//!     let owner = ring.get_node(b"user:123").expect("ring is not empty");
//!     owner.set(123, Bytes::from_static(b"alice"));
//!
//!     // Members implementing `Migratable` hand their data off when the
//!     // topology changes underneath them.
//!     ring.remove_node(owner.key())?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                HashRing<N>                  │
//! │  vnodes: sorted virtual slot table          │
//! │  slot → owners index   node registry        │
//! └─────────────────────────────────────────────┘
//!         │                        ▲
//!         │ add / remove drives    │ get_node / hash
//!         ▼                        │
//! ┌─────────────────┐    ┌─────────────────┐
//! │ Migratable hook │───▶│ caller's nodes  │
//! │ migrate/transfer│    │ (own the data)  │
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Concurrency
//!
//! One ring instance may be shared across threads; lookups take a read
//! lock, mutations a write lock, and migration hooks run after the write
//! lock is released so they can call back into the ring. See the
//! [`ring`] module docs for the full locking policy.

pub mod config;
pub mod error;
pub mod hasher;
pub mod node;
pub mod ring;
pub mod testing;
pub mod types;

// Re-export main types for convenience
pub use config::{RingConfig, DEFAULT_VIRTUAL_NODE_COUNT};
pub use error::{Error, Result};
pub use hasher::{Fnv1a, RingHasher, Xx32};
pub use node::{Migratable, Node};
pub use ring::HashRing;
pub use testing::{MemoryNode, PlainNode};
pub use types::{NodeId, RingStats, SlotId};
