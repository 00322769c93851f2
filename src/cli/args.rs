//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::application::DocumentFormat;
use crate::domain::NodeId;

/// Convert and query trees stored as adjacency lists or nested sets
#[derive(Parser, Debug)]
#[command(name = "nestree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Output format (default: from config, else json)
    #[arg(long, value_enum, global = true)]
    pub format: Option<DocumentFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert between adjacency list and nested set
    Convert {
        /// Tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write result to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Renumber a nested set to minimal contiguous intervals
    Tighten {
        /// Nested-set document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write result to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Derive node levels of a nested set
    Levels {
        /// Nested-set document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write result to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List ancestors of a node, root first
    Ancestors {
        /// Tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node id
        id: NodeId,
        /// Include the node itself
        #[arg(long)]
        include_self: bool,
    },

    /// List descendants of a node in pre-order
    Descendants {
        /// Tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node id
        id: NodeId,
        /// Include the node itself
        #[arg(long)]
        include_self: bool,
    },

    /// Show tree structure
    Show {
        /// Tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check records and topology
    Validate {
        /// Tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print config template
    Template,
}
