use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::NodeId;

/// Forest node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct ForestNode {
    /// Id of the tree node this entry stands for
    pub id: NodeId,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Arena-based forest: the children-by-parent view of an adjacency list.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Roots are kept in insertion order and act as siblings at level 0.
#[derive(Debug)]
pub struct Forest {
    /// Arena storage for all forest nodes
    arena: Arena<ForestNode>,
    /// Root indices, in insertion order
    roots: Vec<Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, id: NodeId, parent: Option<Index>) -> Index {
        let node = ForestNode {
            id,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, left to right, one root after the other.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Depth-first walk reporting both entering and leaving every node.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    /// Number of levels of the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.walk()
            .filter_map(|visit| match visit {
                Visit::Enter { depth, .. } => Some(depth as usize + 1),
                Visit::Exit { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Ids of all nodes without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id)
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// One step of a [`Walk`].
#[derive(Debug, Clone, Copy)]
pub enum Visit<'a> {
    Enter { node: &'a ForestNode, depth: u32 },
    Exit { node: &'a ForestNode, depth: u32 },
}

/// Explicit-stack depth-first walk emitting `Enter` before a node's
/// children and `Exit` after them.
pub struct Walk<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, u32, bool)>,
}

impl<'a> Walk<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest
            .roots
            .iter()
            .rev()
            .map(|&idx| (idx, 0, false))
            .collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth, entered)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if entered {
                    return Some(Visit::Exit { node, depth });
                }
                self.stack.push((current_idx, depth, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1, false));
                }
                return Some(Visit::Enter { node, depth });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1        5
    // ├── 2
    // │   └── 4
    // └── 3
    fn sample() -> Forest {
        let mut forest = Forest::new();
        let one = forest.insert_node(1, None);
        let two = forest.insert_node(2, Some(one));
        forest.insert_node(3, Some(one));
        forest.insert_node(4, Some(two));
        forest.insert_node(5, None);
        forest
    }

    #[test]
    fn given_forest_when_iterating_then_visits_preorder_root_by_root() {
        let forest = sample();
        let ids: Vec<_> = forest.iter().map(|(_, n)| n.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 5]);
    }

    #[test]
    fn given_forest_when_walking_then_enter_and_exit_are_balanced() {
        let forest = sample();
        let steps: Vec<_> = forest
            .walk()
            .map(|visit| match visit {
                Visit::Enter { node, .. } => format!("+{}", node.id),
                Visit::Exit { node, .. } => format!("-{}", node.id),
            })
            .collect();
        assert_eq!(
            steps,
            vec!["+1", "+2", "+4", "-4", "-2", "+3", "-3", "-1", "+5", "-5"]
        );
    }

    #[test]
    fn given_forest_when_measuring_then_reports_depth_and_leaves() {
        let forest = sample();
        assert_eq!(forest.depth(), 3);
        assert_eq!(forest.leaf_ids(), vec![4, 3, 5]);
        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.len(), 5);
    }

    #[test]
    fn given_empty_forest_when_measuring_then_zero() {
        let forest = Forest::new();
        assert_eq!(forest.depth(), 0);
        assert!(forest.leaf_ids().is_empty());
        assert!(forest.is_empty());
    }
}
