//! Node types and their flat record shapes.
//!
//! Nodes are built from records through `TryFrom`, so a record missing a
//! required field can never end up inside a tree.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Node identifier. `0` is reserved, see [`ROOT_PARENT`].
pub type NodeId = u64;

/// Pre-order depth, roots are at level 0.
pub type Level = u32;

/// `parent_id` of a root node. Not a real node id.
pub const ROOT_PARENT: NodeId = 0;

/// Capabilities shared by every node kind.
pub trait Node {
    fn id(&self) -> NodeId;
    fn level(&self) -> Option<Level>;
    fn set_level(&mut self, level: Option<Level>);
}

/// Adjacency-list node: knows its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyNode {
    pub id: NodeId,
    /// Parent id, [`ROOT_PARENT`] for roots
    pub parent_id: NodeId,
    pub level: Option<Level>,
}

impl AdjacencyNode {
    pub fn new(id: NodeId, parent_id: NodeId) -> Self {
        Self {
            id,
            parent_id,
            level: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

impl Node for AdjacencyNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn level(&self) -> Option<Level> {
        self.level
    }

    fn set_level(&mut self, level: Option<Level>) {
        self.level = level;
    }
}

/// Nested-set node: owns the interval `[left, right]` of its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedNode {
    pub id: NodeId,
    pub left: u64,
    pub right: u64,
    pub level: Option<Level>,
}

impl NestedNode {
    pub fn new(id: NodeId, left: u64, right: u64) -> Self {
        Self {
            id,
            left,
            right,
            level: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn is_root(&self) -> bool {
        self.left == 1
    }

    pub fn is_leaf(&self) -> bool {
        self.width() == 1
    }

    pub fn width(&self) -> u64 {
        self.right.saturating_sub(self.left)
    }

    /// Strict containment: `other` lies inside this interval.
    pub fn contains(&self, other: &NestedNode) -> bool {
        self.left < other.left && self.right > other.right
    }

    pub fn is_disjoint(&self, other: &NestedNode) -> bool {
        self.right < other.left || other.right < self.left
    }

    /// Order by `left`, which is pre-order for a valid nested set.
    pub fn cmp_left(&self, other: &NestedNode) -> Ordering {
        self.left.cmp(&other.left)
    }
}

impl Node for NestedNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn level(&self) -> Option<Level> {
        self.level
    }

    fn set_level(&mut self, level: Option<Level>) {
        self.level = level;
    }
}

/// Flat record of an adjacency-list node. All fields optional so that a
/// missing field is reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyRecord {
    pub id: Option<NodeId>,
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

/// Flat record of a nested-set node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRecord {
    pub id: Option<NodeId>,
    pub left: Option<u64>,
    pub right: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

fn require<T>(value: Option<T>, kind: &'static str, field: &'static str) -> DomainResult<T> {
    value.ok_or(DomainError::MissingField { kind, field })
}

fn checked_id(id: NodeId) -> DomainResult<NodeId> {
    if id == ROOT_PARENT {
        return Err(DomainError::InvalidRecord {
            id,
            reason: "id 0 is reserved for the root parent".to_string(),
        });
    }
    Ok(id)
}

impl TryFrom<AdjacencyRecord> for AdjacencyNode {
    type Error = DomainError;

    fn try_from(record: AdjacencyRecord) -> DomainResult<Self> {
        let id = checked_id(require(record.id, "adjacency list", "id")?)?;
        let parent_id = require(record.parent_id, "adjacency list", "parent_id")?;
        if parent_id == id {
            return Err(DomainError::InvalidRecord {
                id,
                reason: "node is its own parent".to_string(),
            });
        }
        Ok(Self {
            id,
            parent_id,
            level: record.level,
        })
    }
}

impl TryFrom<NestedRecord> for NestedNode {
    type Error = DomainError;

    fn try_from(record: NestedRecord) -> DomainResult<Self> {
        let id = checked_id(require(record.id, "nested set", "id")?)?;
        let left = require(record.left, "nested set", "left")?;
        let right = require(record.right, "nested set", "right")?;
        if right <= left {
            return Err(DomainError::InvalidRecord {
                id,
                reason: format!("right ({right}) must be greater than left ({left})"),
            });
        }
        Ok(Self {
            id,
            left,
            right,
            level: record.level,
        })
    }
}

impl From<&AdjacencyNode> for AdjacencyRecord {
    fn from(node: &AdjacencyNode) -> Self {
        Self {
            id: Some(node.id),
            parent_id: Some(node.parent_id),
            level: node.level,
        }
    }
}

impl From<&NestedNode> for NestedRecord {
    fn from(node: &NestedNode) -> Self {
        Self {
            id: Some(node.id),
            left: Some(node.left),
            right: Some(node.right),
            level: node.level,
        }
    }
}
