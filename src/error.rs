//! Error types for the hash ring.

use crate::types::NodeId;
use thiserror::Error;

/// Result type alias for ring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hash ring.
#[derive(Error, Debug)]
pub enum Error {
    /// A node with the same identity is already registered.
    ///
    /// Returned by `add_node` when `hash(node.key())` collides with an
    /// existing registry entry. No ring state has been modified.
    #[error("node already exists: {0}")]
    NodeExists(NodeId),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// A `Migratable` hook failed while moving data.
    ///
    /// The ring table mutation has already committed when hooks run, so
    /// topology is correct but data movement may be incomplete. The
    /// collaborator is responsible for detecting and resuming it.
    #[error("migration failed: {0}")]
    Migration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::NodeExists(42).to_string(),
            "node already exists: 42"
        );
        assert_eq!(
            Error::Config("virtual node count must be >= 1".into()).to_string(),
            "config error: virtual node count must be >= 1"
        );
    }
}
