//! Tree documents: the on-disk shape of a tree.
//!
//! ```json
//! { "kind": "adjacency_list", "nodes": [ { "id": 1, "parent_id": 0 } ] }
//! ```
//!
//! TOML documents use the same layout (`kind = "nested_set"` plus
//! `[[nodes]]` tables).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    AdjacencyList, AdjacencyRecord, AnyTree, DomainResult, NestedRecord, NestedSet, TreeKind,
};

/// Serialization format of a tree document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Toml,
}

impl DocumentFormat {
    /// Format implied by the file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn parse(self, content: &str, path: &Path) -> ApplicationResult<TreeDocument> {
        let parsed = match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ApplicationError::Document {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn render(self, document: &TreeDocument, pretty: bool) -> ApplicationResult<String> {
        let rendered = match (self, pretty) {
            (Self::Json, true) => serde_json::to_string_pretty(document).map_err(box_err),
            (Self::Json, false) => serde_json::to_string(document).map_err(box_err),
            (Self::Toml, true) => toml::to_string_pretty(document).map_err(box_err),
            (Self::Toml, false) => toml::to_string(document).map_err(box_err),
        };
        rendered.map_err(|source| ApplicationError::OperationFailed {
            context: format!("serialize {self:?} tree document"),
            source,
        })
    }
}

fn box_err<E>(e: E) -> Box<dyn std::error::Error + Send + Sync>
where
    E: std::error::Error + Send + Sync + 'static,
{
    Box::new(e)
}

/// Flat records of one tree, tagged with their representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "nodes", rename_all = "snake_case")]
pub enum TreeDocument {
    AdjacencyList(Vec<AdjacencyRecord>),
    NestedSet(Vec<NestedRecord>),
}

impl TreeDocument {
    pub fn kind(&self) -> TreeKind {
        match self {
            TreeDocument::AdjacencyList(_) => TreeKind::AdjacencyList,
            TreeDocument::NestedSet(_) => TreeKind::NestedSet,
        }
    }

    pub fn into_tree(self) -> DomainResult<AnyTree> {
        match self {
            TreeDocument::AdjacencyList(records) => {
                AdjacencyList::from_records(records).map(AnyTree::AdjacencyList)
            }
            TreeDocument::NestedSet(records) => {
                NestedSet::from_records(records).map(AnyTree::NestedSet)
            }
        }
    }

    /// Records in tree order; `level` is dropped unless `include_levels`.
    pub fn from_tree(tree: &AnyTree, include_levels: bool) -> Self {
        match tree {
            AnyTree::AdjacencyList(tree) => {
                let mut records = tree.records();
                if !include_levels {
                    records.iter_mut().for_each(|r| r.level = None);
                }
                TreeDocument::AdjacencyList(records)
            }
            AnyTree::NestedSet(tree) => {
                let mut records = tree.records();
                if !include_levels {
                    records.iter_mut().for_each(|r| r.level = None);
                }
                TreeDocument::NestedSet(records)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use rstest::rstest;

    #[rstest]
    #[case("tree.json", Some(DocumentFormat::Json))]
    #[case("tree.TOML", Some(DocumentFormat::Toml))]
    #[case("tree.yaml", None)]
    #[case("tree", None)]
    fn given_path_when_detecting_format_then_uses_extension(
        #[case] path: &str,
        #[case] expected: Option<DocumentFormat>,
    ) {
        assert_eq!(DocumentFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn given_json_document_when_parsing_then_reads_kind_and_records() {
        let json = r#"{"kind":"adjacency_list","nodes":[{"id":1,"parent_id":0},{"id":2,"parent_id":1}]}"#;

        let document = DocumentFormat::Json
            .parse(json, Path::new("tree.json"))
            .unwrap();

        assert_eq!(document.kind(), TreeKind::AdjacencyList);
        let tree = document.into_tree().unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_toml_document_when_parsing_then_reads_nested_set() {
        let content = r#"
kind = "nested_set"

[[nodes]]
id = 1
left = 1
right = 4

[[nodes]]
id = 2
left = 2
right = 3
level = 1
"#;

        let document = DocumentFormat::Toml
            .parse(content, Path::new("tree.toml"))
            .unwrap();

        match document {
            TreeDocument::NestedSet(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].level, Some(1));
                assert_eq!(records[0].level, None);
            }
            other => panic!("unexpected document {other:?}"),
        }
    }

    #[test]
    fn given_garbage_when_parsing_then_document_error_names_path() {
        let err = DocumentFormat::Json
            .parse("not json", Path::new("broken.json"))
            .unwrap_err();

        match err {
            ApplicationError::Document { path, .. } => assert_eq!(path, PathBuf::from("broken.json")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn given_tree_when_exporting_without_levels_then_records_omit_level() {
        let tree: AnyTree = NestedSet::from_records(vec![NestedRecord {
            id: Some(1),
            left: Some(1),
            right: Some(2),
            level: Some(0),
        }])
        .unwrap()
        .into();

        let document = TreeDocument::from_tree(&tree, false);
        let json = DocumentFormat::Json.render(&document, false).unwrap();

        assert_eq!(
            json,
            r#"{"kind":"nested_set","nodes":[{"id":1,"left":1,"right":2}]}"#
        );
    }

    #[test]
    fn given_document_when_rendering_toml_then_parses_back() {
        let document = TreeDocument::AdjacencyList(vec![AdjacencyRecord {
            id: Some(1),
            parent_id: Some(0),
            level: Some(0),
        }]);

        let content = DocumentFormat::Toml.render(&document, true).unwrap();
        let parsed = DocumentFormat::Toml
            .parse(&content, Path::new("tree.toml"))
            .unwrap();

        assert_eq!(parsed, document);
    }
}
