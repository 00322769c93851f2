//! Conversions between the adjacency-list and nested-set forms.

use tracing::{debug, instrument, trace};

use crate::domain::adjacency::AdjacencyList;
use crate::domain::arena::Visit;
use crate::domain::builder::ForestBuilder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::nested_set::NestedSet;
use crate::domain::node::{AdjacencyNode, NestedNode, NodeId, ROOT_PARENT};

/// A tree that can be turned into the other representation.
pub trait Convert {
    type Output;

    fn convert(&self) -> DomainResult<Self::Output>;
}

impl Convert for AdjacencyList {
    type Output = NestedSet;

    /// Pre-order interval assignment.
    ///
    /// One cursor is shared by the whole walk: entering a node takes the
    /// next value as `left`, leaving it takes the next value as `right`.
    /// Successive roots continue the same numbering.
    #[instrument(level = "debug", skip(self))]
    fn convert(&self) -> DomainResult<NestedSet> {
        let forest = ForestBuilder::new().build(self)?;

        let mut cursor: u64 = 1;
        let mut open: Vec<NestedNode> = Vec::new();
        let mut nested = NestedSet::new();

        for visit in forest.walk() {
            match visit {
                Visit::Enter { node, depth } => {
                    open.push(NestedNode::new(node.id, cursor, 0).with_level(depth));
                    cursor += 1;
                }
                Visit::Exit { node, .. } => {
                    let mut finished = open.pop().ok_or_else(|| {
                        DomainError::InvalidTopology(format!("unbalanced walk at node {}", node.id))
                    })?;
                    finished.right = cursor;
                    cursor += 1;
                    trace!("node {} -> [{}, {}]", finished.id, finished.left, finished.right);
                    nested.set_node(finished);
                }
            }
        }

        nested.sort();
        debug!("converted {} nodes to nested set", nested.len());
        Ok(nested)
    }
}

impl Convert for NestedSet {
    type Output = AdjacencyList;

    /// Parent links from levels: a node's parent is the nearest preceding
    /// node (in `left` order) one level above it.
    ///
    /// Levels are derived first when any node lacks one. Stored levels must
    /// match the interval nesting depth.
    #[instrument(level = "debug", skip(self))]
    fn convert(&self) -> DomainResult<AdjacencyList> {
        let mut working = self.clone();
        if working.has_levels() {
            check_levels(&working)?;
            working.sort();
        } else {
            working.set_levels()?;
        }

        // ancestors[l] is the latest node seen at level l
        let mut ancestors: Vec<NodeId> = Vec::new();
        let mut adjacency = AdjacencyList::new();

        for node in working.iter() {
            let level = node.level.ok_or_else(|| {
                DomainError::InvalidTopology(format!("node {} has no level", node.id))
            })?;
            let depth = level as usize;
            if depth > ancestors.len() {
                return Err(DomainError::InvalidTopology(format!(
                    "node {} at level {} has no ancestor at level {}",
                    node.id,
                    level,
                    ancestors.len()
                )));
            }
            ancestors.truncate(depth);
            let parent_id = ancestors.last().copied().unwrap_or(ROOT_PARENT);
            trace!("node {} level {} parent {}", node.id, level, parent_id);

            adjacency.set_node(AdjacencyNode::new(node.id, parent_id).with_level(level));
            ancestors.push(node.id);
        }

        debug!("converted {} nodes to adjacency list", adjacency.len());
        Ok(adjacency)
    }
}

/// Validate intervals and reject any stored level that differs from the
/// node's nesting depth.
fn check_levels(tree: &NestedSet) -> DomainResult<()> {
    for placement in tree.placements()? {
        let node = placement.node;
        if node.level != Some(placement.depth) {
            return Err(DomainError::InvalidTopology(format!(
                "node {} has level {} but is nested {} deep",
                node.id,
                node.level.map_or_else(|| "none".to_string(), |l| l.to_string()),
                placement.depth
            )));
        }
    }
    Ok(())
}

/// Which representation a tree uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    AdjacencyList,
    NestedSet,
}

impl std::fmt::Display for TreeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeKind::AdjacencyList => write!(f, "adjacency list"),
            TreeKind::NestedSet => write!(f, "nested set"),
        }
    }
}

/// Either representation, for callers that do not know the form up front.
#[derive(Debug, Clone)]
pub enum AnyTree {
    AdjacencyList(AdjacencyList),
    NestedSet(NestedSet),
}

impl AnyTree {
    pub fn kind(&self) -> TreeKind {
        match self {
            AnyTree::AdjacencyList(_) => TreeKind::AdjacencyList,
            AnyTree::NestedSet(_) => TreeKind::NestedSet,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyTree::AdjacencyList(tree) => tree.len(),
            AnyTree::NestedSet(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to the other representation.
    pub fn convert(&self) -> DomainResult<AnyTree> {
        match self {
            AnyTree::AdjacencyList(tree) => tree.convert().map(AnyTree::NestedSet),
            AnyTree::NestedSet(tree) => tree.convert().map(AnyTree::AdjacencyList),
        }
    }
}

impl From<AdjacencyList> for AnyTree {
    fn from(tree: AdjacencyList) -> Self {
        AnyTree::AdjacencyList(tree)
    }
}

impl From<NestedSet> for AnyTree {
    fn from(tree: NestedSet) -> Self {
        AnyTree::NestedSet(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(pairs: &[(NodeId, NodeId)]) -> AdjacencyList {
        pairs
            .iter()
            .map(|&(id, parent)| AdjacencyNode::new(id, parent))
            .collect()
    }

    #[test]
    fn given_adjacency_list_when_converting_then_assigns_preorder_intervals() {
        let tree = list(&[(1, 0), (2, 1), (3, 1), (4, 2)]);

        let nested = tree.convert().unwrap();

        let order: Vec<_> = nested.iter().map(|n| n.id).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
        assert_eq!(*nested.get_node(1).unwrap(), NestedNode::new(1, 1, 8).with_level(0));
        assert_eq!(*nested.get_node(2).unwrap(), NestedNode::new(2, 2, 5).with_level(1));
        assert_eq!(*nested.get_node(4).unwrap(), NestedNode::new(4, 3, 4).with_level(2));
        assert_eq!(*nested.get_node(3).unwrap(), NestedNode::new(3, 6, 7).with_level(1));
    }

    #[test]
    fn given_two_roots_when_converting_then_second_root_follows_first() {
        let tree = list(&[(1, 0), (2, 1), (3, 0)]);

        let nested = tree.convert().unwrap();

        assert_eq!(*nested.get_node(1).unwrap(), NestedNode::new(1, 1, 4).with_level(0));
        assert_eq!(*nested.get_node(3).unwrap(), NestedNode::new(3, 5, 6).with_level(0));
    }

    #[test]
    fn given_nested_set_with_levels_when_converting_then_links_parents() {
        let nested: NestedSet = vec![
            NestedNode::new(3, 6, 7).with_level(1),
            NestedNode::new(1, 1, 8).with_level(0),
            NestedNode::new(2, 2, 5).with_level(1),
            NestedNode::new(4, 3, 4).with_level(2),
        ]
        .into_iter()
        .collect();

        let adjacency = nested.convert().unwrap();

        let parents = adjacency.parent_map();
        assert_eq!(parents[&1], 0);
        assert_eq!(parents[&2], 1);
        assert_eq!(parents[&3], 1);
        assert_eq!(parents[&4], 2);
    }

    #[test]
    fn given_nested_set_without_levels_when_converting_then_derives_them() {
        let nested: NestedSet = vec![
            NestedNode::new(1, 1, 6),
            NestedNode::new(2, 2, 3),
            NestedNode::new(3, 4, 5),
        ]
        .into_iter()
        .collect();

        let adjacency = nested.convert().unwrap();

        assert_eq!(adjacency.get_node(3).unwrap().parent_id, 1);
        assert_eq!(adjacency.get_node(3).unwrap().level, Some(1));
        assert!(nested.iter().all(|n| n.level.is_none()), "input is untouched");
    }

    #[test]
    fn given_level_gap_when_converting_then_invalid_topology() {
        let nested: NestedSet = vec![
            NestedNode::new(1, 1, 4).with_level(0),
            NestedNode::new(2, 2, 3).with_level(2),
        ]
        .into_iter()
        .collect();

        assert!(matches!(
            nested.convert(),
            Err(DomainError::InvalidTopology(_))
        ));
    }

    #[test]
    fn given_level_shallower_than_nesting_when_converting_then_invalid_topology() {
        let nested: NestedSet = vec![
            NestedNode::new(1, 1, 6).with_level(0),
            NestedNode::new(2, 2, 5).with_level(1),
            NestedNode::new(3, 3, 4).with_level(1),
        ]
        .into_iter()
        .collect();

        let err = nested.convert().unwrap_err();

        assert!(matches!(err, DomainError::InvalidTopology(msg) if msg.contains("node 3")));
    }

    #[test]
    fn given_disjoint_node_with_child_level_when_converting_then_invalid_topology() {
        let nested: NestedSet = vec![
            NestedNode::new(1, 1, 2).with_level(0),
            NestedNode::new(2, 3, 4).with_level(1),
        ]
        .into_iter()
        .collect();

        let err = nested.convert().unwrap_err();

        assert!(matches!(err, DomainError::InvalidTopology(msg) if msg.contains("node 2")));
    }

    #[test]
    fn given_any_tree_when_converting_twice_then_returns_to_same_kind() {
        let tree = AnyTree::from(list(&[(1, 0), (2, 1)]));

        let nested = tree.convert().unwrap();
        let back = nested.convert().unwrap();

        assert_eq!(nested.kind(), TreeKind::NestedSet);
        assert_eq!(back.kind(), TreeKind::AdjacencyList);
        assert_eq!(back.len(), 2);
    }
}
