//! Error types for suffix tree construction, queries and reporting
//!
//! We use `thiserror` for the `Display` and `Error` implementations. Only
//! [`Error::MalformedInput`] leaves a tree usable; every other variant raised
//! by an insertion means the tree must be discarded and rebuilt.

use crate::tree::types::UnitId;
use std::io;
use thiserror::Error;

/// Result type alias for suffix tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the suffix tree core
#[derive(Debug, Error)]
pub enum Error {
    /// A unit's text is empty, lacks its terminator, or reuses a terminator
    /// that belongs to another unit. Raised before the tree is touched.
    #[error("Malformed input for unit {unit}: {reason}")]
    MalformedInput {
        /// Unit the rejected text was submitted for
        unit: UnitId,
        /// Human readable description of the violation
        reason: String,
    },

    /// An internal structural invariant does not hold (programming defect)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Cooperative cancellation observed mid-construction or mid-traversal
    #[error("Operation interrupted")]
    Interrupted,

    /// `contains`/`locate` called before any text was inserted
    #[error("Query on empty tree")]
    QueryOnEmptyTree,

    /// Operation not permitted in the tree's current lifecycle state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The tree was left unusable by an earlier interruption or invariant violation
    #[error("Tree is unusable after an earlier failure; rebuild it")]
    Poisoned,

    /// I/O error while writing a report
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error while writing a report
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a [`Error::MalformedInput`] for `unit`
    pub fn malformed(unit: UnitId, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            unit,
            reason: reason.into(),
        }
    }

    /// Build an [`Error::InvariantViolation`]
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }

    /// Whether the tree that raised this error can still be used
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MalformedInput { .. })
    }

    /// Whether this error leaves the tree unusable
    pub(crate) fn poisons_tree(&self) -> bool {
        matches!(self, Error::InvariantViolation(_) | Error::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_malformed() {
        let err = Error::malformed(3, "terminator '$' already used by unit 1");
        let msg = err.to_string();
        assert!(msg.contains("unit 3"));
        assert!(msg.contains("already used"));
    }

    #[test]
    fn test_error_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_recoverability() {
        assert!(Error::malformed(0, "empty").is_recoverable());
        assert!(!Error::Interrupted.is_recoverable());
        assert!(!Error::invariant("dangling child").is_recoverable());
        assert!(!Error::QueryOnEmptyTree.is_recoverable());
    }

    #[test]
    fn test_poisoning_errors() {
        assert!(Error::Interrupted.poisons_tree());
        assert!(Error::invariant("start > end").poisons_tree());
        assert!(!Error::malformed(1, "empty").poisons_tree());
        assert!(!Error::QueryOnEmptyTree.poisons_tree());
    }
}
