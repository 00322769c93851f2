//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree model.
/// These are independent of I/O and configuration concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{kind} record is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("invalid record for node {id}: {reason}")]
    InvalidRecord { id: NodeId, reason: String },

    #[error("record #{index}: {source}")]
    RecordAt {
        index: usize,
        #[source]
        source: Box<DomainError>,
    },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("invalid tree topology: {0}")]
    InvalidTopology(String),

    #[error("tree is empty")]
    EmptyTree,
}

impl DomainError {
    /// Tag an error with the position of the record that caused it.
    pub fn at(self, index: usize) -> Self {
        Self::RecordAt {
            index,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping record position wrappers.
    pub fn root_cause(&self) -> &DomainError {
        match self {
            Self::RecordAt { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
