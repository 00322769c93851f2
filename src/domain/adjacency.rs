//! Adjacency-list tree: every node stores the id of its parent.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{AdjacencyNode, AdjacencyRecord, NodeId};
use crate::domain::node_map::NodeMap;

#[derive(Debug, Clone, Default)]
pub struct AdjacencyList {
    nodes: NodeMap<AdjacencyNode>,
}

impl AdjacencyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from flat records.
    ///
    /// Construction stops at the first malformed record; the error carries
    /// the record's position.
    #[instrument(level = "debug", skip(records))]
    pub fn from_records<I>(records: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = AdjacencyRecord>,
    {
        let mut tree = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            let node = AdjacencyNode::try_from(record).map_err(|e| e.at(index))?;
            tree.set_node(node);
        }
        debug!("built adjacency list with {} nodes", tree.len());
        Ok(tree)
    }

    /// Flat export keyed by id.
    pub fn to_records(&self) -> BTreeMap<NodeId, AdjacencyRecord> {
        self.nodes
            .iter()
            .map(|node| (node.id, AdjacencyRecord::from(node)))
            .collect()
    }

    /// Records in stored order.
    pub fn records(&self) -> Vec<AdjacencyRecord> {
        self.nodes.iter().map(AdjacencyRecord::from).collect()
    }

    pub fn set_node(&mut self, node: AdjacencyNode) {
        self.nodes.insert(node);
    }

    pub fn get_node(&self, id: NodeId) -> DomainResult<&AdjacencyNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[AdjacencyNode] {
        self.nodes.as_slice()
    }

    pub fn set_nodes(&mut self, nodes: impl IntoIterator<Item = AdjacencyNode>) {
        self.nodes.replace(nodes);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdjacencyNode> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &AdjacencyNode> {
        self.nodes.iter().filter(|node| node.is_root())
    }

    /// Direct children of `id` in stored order.
    pub fn children(&self, id: NodeId) -> DomainResult<Vec<&AdjacencyNode>> {
        if !self.contains(id) {
            return Err(DomainError::NodeNotFound(id));
        }
        Ok(self.nodes.iter().filter(|n| n.parent_id == id).collect())
    }

    /// Map of every id to its parent id.
    pub fn parent_map(&self) -> BTreeMap<NodeId, NodeId> {
        self.nodes.iter().map(|n| (n.id, n.parent_id)).collect()
    }
}

impl FromIterator<AdjacencyNode> for AdjacencyList {
    fn from_iter<I: IntoIterator<Item = AdjacencyNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
