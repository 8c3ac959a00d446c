//! The consistent hash ring.
//!
//! Keys are mapped to nodes by hashing both onto a circular 32-bit
//! keyspace. Each real node occupies several virtual slots so that
//! ownership is spread evenly, and membership changes only remap the keys
//! adjacent to the slots that appeared or disappeared.
//!
//! # Locking
//!
//! The ring table, slot ownership index, and node registry form one unit
//! of shared state behind a single `RwLock`. Mutations commit atomically
//! under the write lock; every lookup takes the read lock, so a lookup
//! running between two mutations always sees one fully consistent
//! snapshot.
//!
//! [`Migratable`](crate::Migratable) hooks run *after* the write lock has
//! been released: the
//! topology change is already committed when data starts moving, hooks may
//! freely call back into [`HashRing::get_node`] and [`HashRing::hash`],
//! and a slow handoff blocks only the mutating caller, never unrelated
//! lookups. The flip side is that a failed hook leaves topology correct
//! but data movement incomplete; the error propagates to the caller of
//! [`HashRing::add_node`] / [`HashRing::remove_node`] untouched.

use crate::config::{RingConfig, DEFAULT_PREALLOC_NODE_COUNT};
use crate::error::{Error, Result};
use crate::hasher::RingHasher;
use crate::node::Node;
use crate::types::{NodeId, RingStats, SlotId};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// A consistent hash ring over nodes of type `N`.
///
/// All operations take `&self`; the ring is safe to share across threads
/// behind an `Arc`.
pub struct HashRing<N: Node> {
    hasher: Arc<dyn RingHasher>,
    virtual_node_count: usize,
    state: RwLock<RingState<N>>,
}

struct RingState<N> {
    /// Ascending, distinct virtual slot positions.
    vnodes: Vec<SlotId>,

    /// Slot position to its ordered, non-empty owner list. Key set is
    /// always exactly the value set of `vnodes`.
    slot_owners: HashMap<SlotId, Vec<Arc<N>>>,

    /// Real node identity to the registered node.
    nodes: HashMap<NodeId, Arc<N>>,
}

impl<N> RingState<N> {
    fn with_capacity(virtual_node_count: usize) -> Self {
        let slots = DEFAULT_PREALLOC_NODE_COUNT * virtual_node_count;
        Self {
            vnodes: Vec::with_capacity(slots),
            slot_owners: HashMap::with_capacity(slots),
            nodes: HashMap::with_capacity(DEFAULT_PREALLOC_NODE_COUNT),
        }
    }
}

impl<N: Node> HashRing<N> {
    /// Create an empty ring with default configuration (FNV-1a, 10
    /// virtual slots per node).
    pub fn new() -> Self {
        let config = RingConfig::default();
        Self {
            state: RwLock::new(RingState::with_capacity(config.virtual_node_count)),
            virtual_node_count: config.virtual_node_count,
            hasher: config.hasher,
        }
    }

    /// Create an empty ring from a configuration.
    pub fn with_config(config: RingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: RwLock::new(RingState::with_capacity(config.virtual_node_count)),
            virtual_node_count: config.virtual_node_count,
            hasher: config.hasher,
        })
    }

    /// Hash arbitrary bytes with the ring's hash function.
    ///
    /// Exposed so `Migratable` collaborators compute placement identically
    /// to the ring during handoff.
    pub fn hash(&self, data: &[u8]) -> u32 {
        self.hasher.hash(data)
    }

    /// Position of the `index`-th virtual slot of a node.
    fn slot_of(&self, node_id: NodeId, index: usize) -> SlotId {
        self.hash(&node_id.wrapping_add(index as u32).to_le_bytes())
    }

    /// Number of real nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Whether the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    /// Number of virtual slots generated per real node.
    pub fn virtual_node_count(&self) -> usize {
        self.virtual_node_count
    }

    /// Whether a node with this key is registered.
    pub fn contains_node(&self, key: &[u8]) -> bool {
        let node_id = self.hash(key);
        self.state.read().nodes.contains_key(&node_id)
    }

    /// Identities of all registered nodes, ascending.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.state.read().nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of the ring topology.
    pub fn stats(&self) -> RingStats {
        let state = self.state.read();
        RingStats {
            node_count: state.nodes.len(),
            virtual_slot_count: state.vnodes.len(),
            collided_slot_count: state
                .slot_owners
                .values()
                .filter(|owners| owners.len() > 1)
                .count(),
        }
    }

    /// Add a node to the ring.
    ///
    /// Fails with [`Error::NodeExists`] if `hash(node.key())` is already
    /// registered; no state is modified in that case. If the node is
    /// [`Migratable`] and other nodes already exist, each migratable owner
    /// of the ring successor of every new slot is asked to hand off the
    /// keys the new slot intercepts.
    ///
    /// [`Migratable`]: crate::Migratable
    pub fn add_node(&self, node: Arc<N>) -> Result<()> {
        let node_id = self.hash(node.key());
        let mut new_slots = Vec::with_capacity(self.virtual_node_count);
        let had_peers;
        {
            let mut state = self.state.write();
            if state.nodes.contains_key(&node_id) {
                return Err(Error::NodeExists(node_id));
            }
            had_peers = !state.nodes.is_empty();
            state.nodes.insert(node_id, Arc::clone(&node));
            for index in 0..self.virtual_node_count {
                let slot = self.slot_of(node_id, index);
                new_slots.push(slot);
                match state.slot_owners.entry(slot) {
                    Entry::Occupied(owners) => owners.into_mut().push(Arc::clone(&node)),
                    Entry::Vacant(vacant) => {
                        vacant.insert(vec![Arc::clone(&node)]);
                        state.vnodes.push(slot);
                    }
                }
            }
            state.vnodes.sort_unstable();
        }
        debug!(node_id, slots = new_slots.len(), "node added to ring");

        if node.as_migratable().is_none() || !had_peers {
            return Ok(());
        }
        self.rebalance_into(&node, &mut new_slots)
    }

    /// Drive partial handoff toward a freshly inserted migratable node.
    ///
    /// For each new slot in ascending order, the successor is the smallest
    /// table position strictly greater than it that is not one of the new
    /// node's own slot values, wrapping to the table minimum. Successor
    /// owners are asked to migrate everything the new slot now intercepts.
    fn rebalance_into(&self, node: &Arc<N>, new_slots: &mut Vec<SlotId>) -> Result<()> {
        new_slots.sort_unstable();
        let own_slots: HashSet<SlotId> = new_slots.iter().copied().collect();
        for &sep_slot in new_slots.iter() {
            let donors = {
                let state = self.state.read();
                let start = state.vnodes.partition_point(|&slot| slot <= sep_slot);
                let successor = state.vnodes[start..]
                    .iter()
                    .copied()
                    .find(|slot| !own_slots.contains(slot))
                    .or_else(|| state.vnodes.first().copied());
                match successor {
                    Some(slot) => state.slot_owners.get(&slot).cloned().unwrap_or_default(),
                    None => Vec::new(),
                }
            };
            for donor in donors {
                if let Some(migratable) = donor.as_migratable() {
                    migratable.migrate(self, sep_slot, node.as_ref())?;
                }
            }
        }
        Ok(())
    }

    /// Remove the node registered under `key` from the ring.
    ///
    /// A no-op returning `Ok` if no such node is registered. If the node
    /// is [`Migratable`](crate::Migratable) and the ring is still
    /// non-empty afterwards, the node is asked to transfer all of its data
    /// to the post-removal owners; that hook is the only error source.
    pub fn remove_node(&self, key: &[u8]) -> Result<()> {
        let node_id = self.hash(key);
        let node;
        let now_empty;
        {
            let mut state = self.state.write();
            node = match state.nodes.remove(&node_id) {
                Some(node) => node,
                None => return Ok(()),
            };
            for index in 0..self.virtual_node_count {
                let slot = self.slot_of(node_id, index);
                // A second visit to a duplicated own slot finds it
                // already pruned.
                let emptied = match state.slot_owners.get_mut(&slot) {
                    Some(owners) => {
                        owners.retain(|owner| owner.key() != node.key());
                        owners.is_empty()
                    }
                    None => continue,
                };
                if emptied {
                    state.slot_owners.remove(&slot);
                    if let Ok(position) = state.vnodes.binary_search(&slot) {
                        state.vnodes.remove(position);
                    }
                }
            }
            now_empty = state.nodes.is_empty();
        }
        debug!(node_id, "node removed from ring");

        if now_empty {
            return Ok(());
        }
        match node.as_migratable() {
            Some(migratable) => migratable.transfer(self),
            None => Ok(()),
        }
    }

    /// Find the node that owns `key`.
    ///
    /// Returns `None` only when the ring is empty. The owning slot is the
    /// first table position at or after `hash(key)`, wrapping from the
    /// maximum back to the minimum; a slot co-owned by several nodes picks
    /// `owners[hash % len]`, a stable tie-break independent of insertion
    /// order.
    pub fn get_node(&self, key: &[u8]) -> Option<Arc<N>> {
        let hash = self.hash(key);
        let state = self.state.read();
        if state.vnodes.is_empty() {
            return None;
        }
        let mut position = state.vnodes.partition_point(|&slot| slot < hash);
        if position == state.vnodes.len() {
            position = 0;
        }
        let owners = state.slot_owners.get(&state.vnodes[position])?;
        let owner = if owners.len() == 1 {
            &owners[0]
        } else {
            &owners[hash as usize % owners.len()]
        };
        Some(Arc::clone(owner))
    }

    /// Sample the key distribution across nodes.
    ///
    /// Hashes `sample_size` synthetic keys and counts how many land on
    /// each node. Useful for monitoring balance; see also [`stats`].
    ///
    /// [`stats`]: HashRing::stats
    pub fn key_distribution(&self, sample_size: usize) -> HashMap<NodeId, usize> {
        let mut distribution = HashMap::new();
        for sample in 0..sample_size {
            let key = (sample as u64).to_le_bytes();
            if let Some(owner) = self.get_node(&key) {
                *distribution.entry(self.hash(owner.key())).or_insert(0) += 1;
            }
        }
        distribution
    }
}

impl<N: Node> Default for HashRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
