//! Node and migration capability contracts.
//!
//! Anything placed on the ring implements [`Node`]: a stable byte-sequence
//! identity. Nodes that want to move their data in response to topology
//! changes additionally implement [`Migratable`] and advertise it through
//! the [`Node::as_migratable`] capability query. The ring itself never
//! holds payload data; the hooks on `Migratable` are the only mechanism by
//! which data moves.

use crate::error::Result;
use crate::ring::HashRing;
use crate::types::SlotId;

/// The minimal contract for ring membership.
pub trait Node: Send + Sync + 'static {
    /// Stable, unique identity of this node.
    ///
    /// Must not change while the node is registered on a ring; changing
    /// identity requires remove + add.
    fn key(&self) -> &[u8];

    /// Capability query: does this node participate in data migration?
    ///
    /// The default declines. Implementations that support migration
    /// return `Some(self)`.
    fn as_migratable(&self) -> Option<&dyn Migratable<Self>>
    where
        Self: Sized,
    {
        None
    }
}

/// Optional capability for nodes that hand off data on topology change.
///
/// Both hooks run after the ring's table mutation has committed and its
/// write lock has been released, so they are free to call back into
/// [`HashRing::get_node`] and [`HashRing::hash`]. Errors propagate to the
/// caller of `add_node`/`remove_node`; the ring neither retries nor rolls
/// back topology on a failed hook.
pub trait Migratable<N: Node>: Node {
    /// Partial handoff, invoked on a successor node when a new node is
    /// inserted before it on the ring.
    ///
    /// Must move every locally owned key whose `ring.hash(key)` is
    /// `<= sep_slot` to `dest`, deleting it locally. May be called several
    /// times during a single add (once per new virtual slot), so it must be
    /// idempotent per key, and a handoff to itself must be a no-op.
    fn migrate(&self, ring: &HashRing<N>, sep_slot: SlotId, dest: &N) -> Result<()>;

    /// Full handoff, invoked on a node as it leaves the ring.
    ///
    /// Must move every locally owned key to `ring.get_node(key)`'s current
    /// owner (the ring already reflects the removal) and end with no
    /// locally owned keys.
    fn transfer(&self, ring: &HashRing<N>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryNode, PlainNode};

    #[test]
    fn test_capability_narrowing() {
        let plain = PlainNode::new("plain");
        assert!(plain.as_migratable().is_none());

        let memory = MemoryNode::new("memory");
        assert!(memory.as_migratable().is_some());
    }

    #[test]
    fn test_node_key_is_stable() {
        let node = PlainNode::new("node-1");
        assert_eq!(node.key(), b"node-1");
        assert_eq!(node.key(), node.key());
    }
}
