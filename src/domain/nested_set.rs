//! Nested-set tree: every node owns the interval `[left, right]` of its
//! subtree in a pre-order numbering.
//!
//! Relationships are answered by interval containment. Every algorithm that
//! depends on the intervals being well formed validates them first and
//! fails with [`DomainError::InvalidTopology`] instead of producing a wrong
//! answer.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Level, NestedNode, NestedRecord, Node, NodeId};
use crate::domain::node_map::NodeMap;

#[derive(Debug, Clone, Default)]
pub struct NestedSet {
    nodes: NodeMap<NestedNode>,
}

/// Position of a node inside the containment hierarchy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement<'a> {
    pub node: &'a NestedNode,
    /// Nearest strict ancestor
    pub parent: Option<NodeId>,
    /// Number of strict ancestors
    pub depth: Level,
}

/// Running `left` value shared by the whole tightening walk.
#[derive(Debug)]
struct Cursor {
    next: u64,
}

impl NestedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from flat records, stopping at the first malformed one.
    #[instrument(level = "debug", skip(records))]
    pub fn from_records<I>(records: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = NestedRecord>,
    {
        let mut tree = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            let node = NestedNode::try_from(record).map_err(|e| e.at(index))?;
            tree.set_node(node);
        }
        debug!("built nested set with {} nodes", tree.len());
        Ok(tree)
    }

    /// Flat export keyed by id.
    pub fn to_records(&self) -> BTreeMap<NodeId, NestedRecord> {
        self.nodes
            .iter()
            .map(|node| (node.id, NestedRecord::from(node)))
            .collect()
    }

    /// Records in stored order.
    pub fn records(&self) -> Vec<NestedRecord> {
        self.nodes.iter().map(NestedRecord::from).collect()
    }

    pub fn set_node(&mut self, node: NestedNode) {
        self.nodes.insert(node);
    }

    pub fn get_node(&self, id: NodeId) -> DomainResult<&NestedNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[NestedNode] {
        self.nodes.as_slice()
    }

    pub fn set_nodes(&mut self, nodes: impl IntoIterator<Item = NestedNode>) {
        self.nodes.replace(nodes);
    }

    pub fn into_nodes(self) -> Vec<NestedNode> {
        self.nodes.into_vec()
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

    pub fn iter(&self) -> impl Iterator<Item = &NestedNode> {
        self.nodes.iter()
    }

    /// Sort the stored order by `left` ascending (pre-order).
    #[instrument(level = "trace", skip(self))]
    pub fn sort(&mut self) {
        self.nodes.sort_by(NestedNode::cmp_left);
    }

    pub fn is_sorted(&self) -> bool {
        self.nodes
            .as_slice()
            .windows(2)
            .all(|pair| pair[0].left <= pair[1].left)
    }

    /// Node with the smallest `left`.
    pub fn root_node(&self) -> DomainResult<&NestedNode> {
        self.nodes
            .iter()
            .min_by_key(|node| node.left)
            .ok_or(DomainError::EmptyTree)
    }

    /// True when every node carries a level.
    pub fn has_levels(&self) -> bool {
        self.nodes.iter().all(|node| node.level.is_some())
    }

    /// Nodes whose interval strictly contains the target's, root first.
    #[instrument(level = "debug", skip(self))]
    pub fn ancestors(&self, id: NodeId, include_self: bool) -> DomainResult<Vec<&NestedNode>> {
        let target = self.get_node(id)?;
        Ok(self.ancestors_of(target, include_self))
    }

    /// Like [`ancestors`](Self::ancestors) for a node the caller already holds.
    pub fn ancestors_of<'a>(
        &'a self,
        target: &'a NestedNode,
        include_self: bool,
    ) -> Vec<&'a NestedNode> {
        let mut ancestors: Vec<_> = self
            .nodes
            .iter()
            .filter(|node| node.contains(target))
            .collect();
        ancestors.sort_by(|a, b| a.cmp_left(b));
        if include_self {
            ancestors.push(target);
        }
        ancestors
    }

    /// Nodes whose interval lies strictly inside the target's, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn descendants(&self, id: NodeId, include_self: bool) -> DomainResult<Vec<&NestedNode>> {
        let target = self.get_node(id)?;
        Ok(self.descendants_of(target, include_self))
    }

    /// Like [`descendants`](Self::descendants) for a node the caller already holds.
    pub fn descendants_of<'a>(
        &'a self,
        target: &'a NestedNode,
        include_self: bool,
    ) -> Vec<&'a NestedNode> {
        let mut descendants: Vec<_> = self
            .nodes
            .iter()
            .filter(|node| target.contains(node))
            .collect();
        descendants.sort_by(|a, b| a.cmp_left(b));
        if include_self {
            descendants.insert(0, target);
        }
        descendants
    }

    /// Direct descendants: no other descendant of `id` sits between them.
    pub fn children(&self, id: NodeId) -> DomainResult<Vec<&NestedNode>> {
        let target = self.get_node(id)?;
        let descendants = self.descendants_of(target, false);
        Ok(descendants
            .iter()
            .filter(|d| !descendants.iter().any(|other| other.contains(d)))
            .copied()
            .collect())
    }

    /// Nearest strict ancestor, `None` for top-level nodes.
    pub fn parent(&self, id: NodeId) -> DomainResult<Option<&NestedNode>> {
        let target = self.get_node(id)?;
        Ok(self.ancestors_of(target, false).pop())
    }

    /// Check that intervals are well formed: `right > left`, no shared
    /// endpoints, and every pair is either nested or disjoint.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> DomainResult<()> {
        self.placements().map(|_| ())
    }

    /// Walk the nodes in `left` order keeping a stack of open intervals.
    ///
    /// Yields every node with its nearest ancestor and depth, or the first
    /// violation of the nesting invariant.
    pub(crate) fn placements(&self) -> DomainResult<Vec<Placement<'_>>> {
        let sorted = self.nodes.iter().sorted_by(|a, b| a.cmp_left(b));

        let mut open: Vec<&NestedNode> = Vec::new();
        let mut placements = Vec::with_capacity(sorted.len());
        let mut previous: Option<&NestedNode> = None;

        for node in sorted {
            if node.right <= node.left {
                return Err(DomainError::InvalidTopology(format!(
                    "node {} has right ({}) not greater than left ({})",
                    node.id, node.right, node.left
                )));
            }
            if let Some(prev) = previous {
                if prev.left == node.left {
                    return Err(DomainError::InvalidTopology(format!(
                        "nodes {} and {} share left value {}",
                        prev.id, node.id, node.left
                    )));
                }
            }
            while open.last().is_some_and(|top| top.right < node.left) {
                open.pop();
            }
            if let Some(top) = open.last() {
                if !top.contains(node) {
                    return Err(DomainError::InvalidTopology(format!(
                        "intervals of nodes {} [{}, {}] and {} [{}, {}] overlap",
                        top.id, top.left, top.right, node.id, node.left, node.right
                    )));
                }
            }
            trace!("node {} depth {}", node.id, open.len());
            placements.push(Placement {
                node,
                parent: open.last().map(|top| top.id),
                depth: open.len() as Level,
            });
            open.push(node);
            previous = Some(node);
        }
        Ok(placements)
    }

    /// Derive every node's level from interval nesting.
    ///
    /// A node's level is the number of its strict ancestors, so roots get 0
    /// and direct children sit exactly one below their parent.
    #[instrument(level = "debug", skip(self))]
    pub fn set_levels(&mut self) -> DomainResult<()> {
        self.sort();
        let levels: Vec<(NodeId, Level)> = self
            .placements()?
            .iter()
            .map(|p| (p.node.id, p.depth))
            .collect();
        for (id, level) in levels {
            self.nodes.get_mut(id)?.set_level(Some(level));
        }
        debug!("assigned levels to {} nodes", self.len());
        Ok(())
    }

    /// Renumber in place to the minimal contiguous interval set.
    #[instrument(level = "debug", skip(self))]
    pub fn tighten(&mut self) -> DomainResult<()> {
        let tightened = self.tightened()?;
        self.clear();
        self.set_nodes(tightened.into_nodes());
        Ok(())
    }

    /// Same ids and topology with `1..=2n` each used exactly once and every
    /// leaf of width 1. Existing levels are carried over.
    #[instrument(level = "debug", skip(self))]
    pub fn tightened(&self) -> DomainResult<NestedSet> {
        let placements = self.placements()?;

        let mut children: HashMap<Option<NodeId>, Vec<&NestedNode>> = HashMap::new();
        for placement in &placements {
            children.entry(placement.parent).or_default().push(placement.node);
        }

        // Children always follow their parent in `left` order, so a reverse
        // pass sees every subtree complete before its parent.
        let mut descendant_counts: HashMap<NodeId, u64> = HashMap::new();
        for placement in placements.iter().rev() {
            let count = descendant_counts.get(&placement.node.id).copied().unwrap_or(0);
            if let Some(parent) = placement.parent {
                *descendant_counts.entry(parent).or_insert(0) += count + 1;
            }
        }

        let mut cursor = Cursor { next: 1 };
        let mut tightened = NestedSet::new();
        for top in children.get(&None).into_iter().flatten() {
            tighten_subtree(top, &children, &descendant_counts, &mut cursor, &mut tightened);
        }
        debug!(
            "tightened {} nodes, last right {}",
            tightened.len(),
            cursor.next.saturating_sub(1)
        );
        Ok(tightened)
    }
}

fn tighten_subtree(
    node: &NestedNode,
    children: &HashMap<Option<NodeId>, Vec<&NestedNode>>,
    descendant_counts: &HashMap<NodeId, u64>,
    cursor: &mut Cursor,
    out: &mut NestedSet,
) {
    let descendants = descendant_counts.get(&node.id).copied().unwrap_or(0);
    let left = cursor.next;
    let right = left + descendants * 2 + 1;
    trace!("node {}: [{}, {}] -> [{}, {}]", node.id, node.left, node.right, left, right);

    out.set_node(NestedNode {
        id: node.id,
        left,
        right,
        level: node.level,
    });

    cursor.next = left + 1;
    for child in children.get(&Some(node.id)).into_iter().flatten() {
        tighten_subtree(child, children, descendant_counts, cursor, out);
    }
    cursor.next = right + 1;
}

impl FromIterator<NestedNode> for NestedSet {
    fn from_iter<I: IntoIterator<Item = NestedNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
