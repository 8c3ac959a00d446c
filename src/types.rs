//! Core types used throughout the hash ring.

use serde::Serialize;

/// Identity of a real node on the ring: the 32-bit hash of its key.
pub type NodeId = u32;

/// Position of a virtual node on the ring.
pub type SlotId = u32;

/// Point-in-time snapshot of ring topology, for monitoring and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RingStats {
    /// Number of real nodes registered on the ring.
    pub node_count: usize,

    /// Number of distinct virtual slots in the ring table.
    ///
    /// At most `node_count * virtual_node_count`; lower when virtual
    /// slots collide.
    pub virtual_slot_count: usize,

    /// Number of slots currently co-owned by more than one node.
    pub collided_slot_count: usize,
}
