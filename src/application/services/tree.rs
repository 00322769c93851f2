//! Tree document service
//!
//! Loads tree documents, runs the domain algorithms on them and writes the
//! results back.

use std::path::Path;
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::document::{DocumentFormat, TreeDocument};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    AnyTree, Convert, ForestBuilder, NestedNode, NestedSet, NodeId, TreeDisplay, TreeKind,
};
use crate::infrastructure::traits::FileSystem;

/// Shape of a document that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSummary {
    pub kind: TreeKind,
    pub nodes: usize,
    pub roots: usize,
    /// Number of levels of the deepest tree
    pub depth: usize,
    /// Leaf ids in pre-order
    pub leaves: Vec<NodeId>,
}

/// Service for loading, transforming and saving tree documents.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Format for `path`: its extension, else the configured default.
    pub fn format_for(&self, path: &Path) -> DocumentFormat {
        DocumentFormat::from_path(path).unwrap_or(self.settings.format)
    }

    /// Read and parse a tree document.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<AnyTree> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree document", path)?;
        let document = self.format_for(path).parse(&content, path)?;
        let tree = document.into_tree()?;
        debug!("loaded {} with {} nodes", tree.kind(), tree.len());
        Ok(tree)
    }

    /// Load a document that must hold a nested set.
    pub fn load_nested_set(&self, path: &Path) -> ApplicationResult<NestedSet> {
        match self.load(path)? {
            AnyTree::NestedSet(tree) => Ok(tree),
            other => Err(ApplicationError::WrongKind {
                expected: TreeKind::NestedSet,
                found: other.kind(),
            }),
        }
    }

    /// Serialize a tree with the settings' level and pretty-print options.
    pub fn render(&self, tree: &AnyTree, format: DocumentFormat) -> ApplicationResult<String> {
        let document = TreeDocument::from_tree(tree, self.settings.include_levels);
        format.render(&document, self.settings.pretty)
    }

    /// Write a tree to `path`, format chosen by extension.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, tree: &AnyTree, path: &Path) -> ApplicationResult<()> {
        let content = self.render(tree, self.format_for(path))?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write tree document", path)?;
        info!("wrote {} with {} nodes to {}", tree.kind(), tree.len(), path.display());
        Ok(())
    }

    /// Load a tree and convert it to the other representation.
    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, path: &Path) -> ApplicationResult<AnyTree> {
        let tree = self.load(path)?;
        let converted = tree.convert()?;
        info!("converted {} to {}", tree.kind(), converted.kind());
        Ok(converted)
    }

    /// Load a nested set and renumber it to the minimal interval set.
    #[instrument(level = "debug", skip(self))]
    pub fn tighten(&self, path: &Path) -> ApplicationResult<AnyTree> {
        let mut tree = self.load_nested_set(path)?;
        tree.tighten()?;
        Ok(tree.into())
    }

    /// Load a nested set and derive its levels.
    #[instrument(level = "debug", skip(self))]
    pub fn levels(&self, path: &Path) -> ApplicationResult<AnyTree> {
        let mut tree = self.load_nested_set(path)?;
        tree.set_levels()?;
        Ok(tree.into())
    }

    /// Ancestors of `id`, converting adjacency input first.
    #[instrument(level = "debug", skip(self))]
    pub fn ancestors(
        &self,
        path: &Path,
        id: NodeId,
        include_self: bool,
    ) -> ApplicationResult<Vec<NestedNode>> {
        let tree = self.queryable(path)?;
        Ok(tree.ancestors(id, include_self)?.into_iter().cloned().collect())
    }

    /// Descendants of `id`, converting adjacency input first.
    #[instrument(level = "debug", skip(self))]
    pub fn descendants(
        &self,
        path: &Path,
        id: NodeId,
        include_self: bool,
    ) -> ApplicationResult<Vec<NestedNode>> {
        let tree = self.queryable(path)?;
        Ok(tree.descendants(id, include_self)?.into_iter().cloned().collect())
    }

    /// Check a document: parse errors, dangling parents, cycles, overlaps.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self, path: &Path) -> ApplicationResult<TreeSummary> {
        let tree = self.load(path)?;
        let forest = match &tree {
            AnyTree::AdjacencyList(list) => ForestBuilder::new().build(list)?,
            AnyTree::NestedSet(nested) => ForestBuilder::new().build(&nested.convert()?)?,
        };
        let summary = TreeSummary {
            kind: tree.kind(),
            nodes: forest.len(),
            roots: forest.roots().len(),
            depth: forest.depth(),
            leaves: forest.leaf_ids(),
        };
        debug!("validated {:?}", summary);
        Ok(summary)
    }

    /// Render the document as text trees, one per root.
    pub fn show(&self, path: &Path) -> ApplicationResult<Vec<Tree<String>>> {
        let rendered = match self.load(path)? {
            AnyTree::AdjacencyList(tree) => tree.to_tree_string()?,
            AnyTree::NestedSet(tree) => tree.to_tree_string()?,
        };
        Ok(rendered)
    }

    fn queryable(&self, path: &Path) -> ApplicationResult<NestedSet> {
        let tree = match self.load(path)? {
            AnyTree::NestedSet(tree) => tree,
            AnyTree::AdjacencyList(tree) => {
                debug!("converting adjacency list before query");
                tree.convert()?
            }
        };
        if self.settings.validate {
            tree.validate()?;
        }
        Ok(tree)
    }
}
