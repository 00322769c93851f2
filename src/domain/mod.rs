//! Domain layer: tree representations and the algorithms between them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod adjacency;
pub mod arena;
pub mod builder;
pub mod convert;
pub mod error;
pub mod nested_set;
pub mod node;
pub mod node_map;
pub mod render;

pub use adjacency::AdjacencyList;
pub use arena::{Forest, ForestNode, Visit};
pub use builder::ForestBuilder;
pub use convert::{AnyTree, Convert, TreeKind};
pub use error::{DomainError, DomainResult};
pub use nested_set::NestedSet;
pub use node::{
    AdjacencyNode, AdjacencyRecord, Level, NestedNode, NestedRecord, Node, NodeId, ROOT_PARENT,
};
pub use node_map::NodeMap;
pub use render::TreeDisplay;
