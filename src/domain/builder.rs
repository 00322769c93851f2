//! Forest builder: turns an adjacency list into an arena forest.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::adjacency::AdjacencyList;
use crate::domain::arena::Forest;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::NodeId;

/// Constructs an arena forest from parent links.
///
/// Children keep the order in which they appear in the adjacency list.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    relationship_cache: HashMap<NodeId, Vec<NodeId>>,
    visited: HashSet<NodeId>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest, rejecting dangling parents and nodes that no root
    /// reaches (cycles).
    #[instrument(level = "debug", skip(self, tree))]
    pub fn build(&mut self, tree: &AdjacencyList) -> DomainResult<Forest> {
        // Reset state for a fresh build
        self.relationship_cache.clear();
        self.visited.clear();

        self.scan(tree)?;

        let root_ids: Vec<NodeId> = tree.roots().map(|node| node.id).collect();
        if root_ids.is_empty() && !tree.is_empty() {
            return Err(DomainError::InvalidTopology(
                "no root node (parent_id 0) found".to_string(),
            ));
        }

        let mut forest = Forest::new();
        for root in root_ids {
            self.build_tree(root, &mut forest)?;
        }

        if self.visited.len() != tree.len() {
            let unreachable = tree
                .iter()
                .map(|node| node.id)
                .filter(|id| !self.visited.contains(id))
                .sorted_unstable()
                .join(", ");
            return Err(DomainError::InvalidTopology(format!(
                "nodes not reachable from any root (cycle): [{unreachable}]"
            )));
        }

        debug!(
            "built forest with {} nodes and {} roots",
            forest.len(),
            forest.roots().len()
        );
        Ok(forest)
    }

    fn scan(&mut self, tree: &AdjacencyList) -> DomainResult<()> {
        for node in tree.iter().filter(|node| !node.is_root()) {
            if !tree.contains(node.parent_id) {
                return Err(DomainError::InvalidTopology(format!(
                    "node {} references unknown parent {}",
                    node.id, node.parent_id
                )));
            }
            self.relationship_cache
                .entry(node.parent_id)
                .or_default()
                .push(node.id);
        }
        Ok(())
    }

    fn build_tree(&mut self, root: NodeId, forest: &mut Forest) -> DomainResult<()> {
        let mut stack = vec![(root, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            if !self.visited.insert(current) {
                return Err(DomainError::InvalidTopology(format!(
                    "node {current} reached twice"
                )));
            }

            let current_idx = forest.insert_node(current, parent_idx);

            // Reverse so that children are inserted in their original order
            if let Some(children) = self.relationship_cache.get(&current) {
                for &child in children.iter().rev() {
                    stack.push((child, Some(current_idx)));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::AdjacencyNode;

    fn list(pairs: &[(NodeId, NodeId)]) -> AdjacencyList {
        pairs
            .iter()
            .map(|&(id, parent)| AdjacencyNode::new(id, parent))
            .collect()
    }

    #[test]
    fn given_adjacency_list_when_building_then_children_keep_order() {
        let tree = list(&[(1, 0), (3, 1), (2, 1), (4, 3)]);

        let forest = ForestBuilder::new().build(&tree).unwrap();

        let ids: Vec<_> = forest.iter().map(|(_, n)| n.id).collect();
        assert_eq!(ids, vec![1, 3, 4, 2]);
    }

    #[test]
    fn given_children_listed_before_parent_when_building_then_succeeds() {
        let tree = list(&[(4, 2), (2, 1), (1, 0)]);

        let forest = ForestBuilder::new().build(&tree).unwrap();

        assert_eq!(forest.depth(), 3);
    }

    #[test]
    fn given_unknown_parent_when_building_then_invalid_topology() {
        let tree = list(&[(1, 0), (2, 9)]);

        let err = ForestBuilder::new().build(&tree).unwrap_err();

        assert!(matches!(err, DomainError::InvalidTopology(msg) if msg.contains("unknown parent 9")));
    }

    #[test]
    fn given_cycle_when_building_then_invalid_topology() {
        let tree = list(&[(1, 0), (2, 3), (3, 2)]);

        let err = ForestBuilder::new().build(&tree).unwrap_err();

        assert!(matches!(err, DomainError::InvalidTopology(msg) if msg.contains("[2, 3]")));
    }

    #[test]
    fn given_only_cycle_when_building_then_reports_missing_root() {
        let tree = list(&[(2, 3), (3, 2)]);

        assert!(ForestBuilder::new().build(&tree).is_err());
    }

    #[test]
    fn given_empty_list_when_building_then_empty_forest() {
        let forest = ForestBuilder::new().build(&AdjacencyList::new()).unwrap();
        assert!(forest.is_empty());
    }
}
