//! Text rendering of trees through `termtree`.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::adjacency::AdjacencyList;
use crate::domain::arena::Forest;
use crate::domain::builder::ForestBuilder;
use crate::domain::error::DomainResult;
use crate::domain::nested_set::NestedSet;
use crate::domain::node::{NestedNode, NodeId};

/// Render a tree as one `termtree` per root.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> DomainResult<Vec<Tree<String>>>;
}

impl TreeDisplay for Forest {
    fn to_tree_string(&self) -> DomainResult<Vec<Tree<String>>> {
        fn build_tree(forest: &Forest, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = forest.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = forest.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.id.to_string());
                        build_tree(forest, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut trees = Vec::with_capacity(self.roots().len());
        for &root_idx in self.roots() {
            if let Some(root) = self.get_node(root_idx) {
                let mut tree = Tree::new(root.id.to_string());
                build_tree(self, root_idx, &mut tree);
                trees.push(tree);
            }
        }
        Ok(trees)
    }
}

impl TreeDisplay for AdjacencyList {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> DomainResult<Vec<Tree<String>>> {
        ForestBuilder::new().build(self)?.to_tree_string()
    }
}

impl TreeDisplay for NestedSet {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> DomainResult<Vec<Tree<String>>> {
        fn label(node: &NestedNode) -> String {
            format!("{} [{}, {}]", node.id, node.left, node.right)
        }

        fn build_tree(
            node: &NestedNode,
            children: &HashMap<Option<NodeId>, Vec<&NestedNode>>,
        ) -> Tree<String> {
            let leaves: Vec<_> = children
                .get(&Some(node.id))
                .into_iter()
                .flatten()
                .map(|child| build_tree(child, children))
                .collect();
            Tree::new(label(node)).with_leaves(leaves)
        }

        let placements = self.placements()?;
        let mut children: HashMap<Option<NodeId>, Vec<&NestedNode>> = HashMap::new();
        for placement in &placements {
            children.entry(placement.parent).or_default().push(placement.node);
        }

        Ok(children
            .get(&None)
            .into_iter()
            .flatten()
            .map(|root| build_tree(root, &children))
            .collect())
    }
}
