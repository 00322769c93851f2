//! Id-keyed node storage that keeps an explicit, re-sortable order.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId};

/// Ordered collection of nodes with O(1) lookup by id.
///
/// Inserting an id that is already present overwrites the stored node in
/// its current position. Nodes are never removed individually.
#[derive(Debug, Clone)]
pub struct NodeMap<N: Node> {
    nodes: Vec<N>,
    index: HashMap<NodeId, usize>,
}

impl<N: Node> Default for NodeMap<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> NodeMap<N> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn insert(&mut self, node: N) {
        match self.index.get(&node.id()) {
            Some(&pos) => self.nodes[pos] = node,
            None => {
                self.index.insert(node.id(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn get(&self, id: NodeId) -> DomainResult<&N> {
        self.index
            .get(&id)
            .map(|&pos| &self.nodes[pos])
            .ok_or(DomainError::NodeNotFound(id))
    }

    /// Mutable access for in-place updates. The node's id must stay unchanged,
    /// otherwise the index goes stale.
    pub(crate) fn get_mut(&mut self, id: NodeId) -> DomainResult<&mut N> {
        match self.index.get(&id) {
            Some(&pos) => Ok(&mut self.nodes[pos]),
            None => Err(DomainError::NodeNotFound(id)),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }

    /// Replace the whole node set. Later duplicates overwrite earlier ones.
    pub fn replace(&mut self, nodes: impl IntoIterator<Item = N>) {
        self.clear();
        for node in nodes {
            self.insert(node);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Stable sort of the stored order.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&N, &N) -> Ordering,
    {
        self.nodes.sort_by(compare);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id(), pos))
            .collect();
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }
}

impl<N: Node> FromIterator<N> for NodeMap<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut map = Self::new();
        map.replace(iter);
        map
    }
}

impl<'a, N: Node> IntoIterator for &'a NodeMap<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::AdjacencyNode;

    #[test]
    fn given_duplicate_id_when_inserting_then_overwrites_in_place() {
        let mut map = NodeMap::new();
        map.insert(AdjacencyNode::new(1, 0));
        map.insert(AdjacencyNode::new(2, 1));
        map.insert(AdjacencyNode::new(1, 7));

        assert_eq!(map.len(), 2);
        assert_eq!(map.as_slice()[0].parent_id, 7);
        assert_eq!(map.get(1).unwrap().parent_id, 7);
    }

    #[test]
    fn given_unknown_id_when_getting_then_returns_not_found() {
        let map: NodeMap<AdjacencyNode> = NodeMap::new();
        assert_eq!(map.get(42).unwrap_err(), DomainError::NodeNotFound(42));
    }

    #[test]
    fn given_sorted_map_when_looking_up_then_index_follows_new_order() {
        let mut map: NodeMap<AdjacencyNode> =
            [3, 1, 2].into_iter().map(|id| AdjacencyNode::new(id, 0)).collect();
        map.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<_> = map.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(map.get(3).unwrap().id, 3);
        map.get_mut(2).unwrap().parent_id = 1;
        assert_eq!(map.as_slice()[1].parent_id, 1);
    }
}
