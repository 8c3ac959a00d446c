//! Test fixtures for exercising the ring.
//!
//! The ring itself never stores payload data, so verifying migration needs
//! a node that does. [`MemoryNode`] is a minimal concurrent key-value
//! store implementing both capability contracts; [`PlainNode`] is an
//! identity-only member used to exercise capability narrowing. Entry keys
//! are `u64` values hashed through their little-endian encoding.

use crate::error::{Error, Result};
use crate::node::{Migratable, Node};
use crate::ring::HashRing;
use crate::types::SlotId;
use bytes::Bytes;
use dashmap::DashMap;

/// A ring member with no storage and no migration capability.
#[derive(Debug)]
pub struct PlainNode {
    id: String,
}

impl PlainNode {
    /// Create a node identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The node's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Node for PlainNode {
    fn key(&self) -> &[u8] {
        self.id.as_bytes()
    }
}

/// An in-memory cache node that participates in data migration.
#[derive(Debug, Default)]
pub struct MemoryNode {
    id: String,
    entries: DashMap<u64, Bytes>,
}

impl MemoryNode {
    /// Create an empty cache node identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: DashMap::new(),
        }
    }

    /// The node's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up a locally stored entry.
    pub fn get(&self, key: u64) -> Option<Bytes> {
        self.entries.get(&key).map(|entry| entry.value().clone())
    }

    /// Store an entry locally.
    pub fn set(&self, key: u64, value: Bytes) {
        self.entries.insert(key, value);
    }

    /// Delete a locally stored entry.
    pub fn remove(&self, key: u64) {
        self.entries.remove(&key);
    }

    /// Number of locally stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the node stores no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ring placement bytes for an entry key.
    pub fn entry_key_bytes(key: u64) -> [u8; 8] {
        key.to_le_bytes()
    }
}

impl Node for MemoryNode {
    fn key(&self) -> &[u8] {
        self.id.as_bytes()
    }

    fn as_migratable(&self) -> Option<&dyn Migratable<Self>> {
        Some(self)
    }
}

impl Migratable<MemoryNode> for MemoryNode {
    fn migrate(
        &self,
        ring: &HashRing<MemoryNode>,
        sep_slot: SlotId,
        dest: &MemoryNode,
    ) -> Result<()> {
        if self.id == dest.id {
            return Ok(());
        }
        // Snapshot the moving keys first; removing while iterating a
        // DashMap can deadlock on its shard locks.
        let moving: Vec<u64> = self
            .entries
            .iter()
            .filter(|entry| ring.hash(&Self::entry_key_bytes(*entry.key())) <= sep_slot)
            .map(|entry| *entry.key())
            .collect();
        for key in moving {
            if let Some((key, value)) = self.entries.remove(&key) {
                dest.set(key, value);
            }
        }
        Ok(())
    }

    fn transfer(&self, ring: &HashRing<MemoryNode>) -> Result<()> {
        let keys: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
        for key in keys {
            let owner = ring
                .get_node(&Self::entry_key_bytes(key))
                .ok_or_else(|| Error::Migration(format!("no owner for entry {key}")))?;
            if owner.id == self.id {
                continue;
            }
            if let Some((key, value)) = self.entries.remove(&key) {
                owner.set(key, value);
            }
        }
        Ok(())
    }
}
