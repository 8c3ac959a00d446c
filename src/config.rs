//! Configuration types for the hash ring.

use crate::error::{Error, Result};
use crate::hasher::{Fnv1a, RingHasher};
use std::fmt;
use std::sync::Arc;

/// Default number of virtual slots generated per real node.
pub const DEFAULT_VIRTUAL_NODE_COUNT: usize = 10;

/// Pre-allocation hint: expected number of real nodes on a fresh ring.
pub(crate) const DEFAULT_PREALLOC_NODE_COUNT: usize = 8;

/// Configuration for a [`HashRing`](crate::HashRing).
#[derive(Clone)]
pub struct RingConfig {
    /// Number of virtual slots per real node. More slots give a smoother
    /// key distribution at the cost of a larger ring table.
    pub virtual_node_count: usize,

    /// Hash function used for node identity and every placement decision.
    pub hasher: Arc<dyn RingHasher>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            virtual_node_count: DEFAULT_VIRTUAL_NODE_COUNT,
            hasher: Arc::new(Fnv1a::new()),
        }
    }
}

impl RingConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of virtual slots per real node.
    pub fn with_virtual_node_count(mut self, count: usize) -> Self {
        self.virtual_node_count = count;
        self
    }

    /// Set the hash function.
    pub fn with_hasher(mut self, hasher: impl RingHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.virtual_node_count == 0 {
            return Err(Error::Config(
                "virtual node count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for RingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingConfig")
            .field("virtual_node_count", &self.virtual_node_count)
            .finish_non_exhaustive()
    }
}
