//! Shared test helpers: logging setup and sample trees.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{AdjacencyList, AdjacencyNode, NestedNode, NestedSet, NodeId};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Adjacency list from `(id, parent_id)` pairs, in the given order.
pub fn adjacency(pairs: &[(NodeId, NodeId)]) -> AdjacencyList {
    pairs
        .iter()
        .map(|&(id, parent)| AdjacencyNode::new(id, parent))
        .collect()
}

/// Nested set from `(id, left, right)` triples without levels.
pub fn nested(triples: &[(NodeId, u64, u64)]) -> NestedSet {
    triples
        .iter()
        .map(|&(id, left, right)| NestedNode::new(id, left, right))
        .collect()
}

/// Root 1 with children 2 and 3; 4 is a child of 2.
pub fn sample_adjacency() -> AdjacencyList {
    adjacency(&[(1, 0), (2, 1), (3, 1), (4, 2)])
}

/// `sample_adjacency` in nested-set form, with levels.
pub fn sample_nested() -> NestedSet {
    [
        NestedNode::new(1, 1, 8).with_level(0),
        NestedNode::new(2, 2, 5).with_level(1),
        NestedNode::new(4, 3, 4).with_level(2),
        NestedNode::new(3, 6, 7).with_level(1),
    ]
    .into_iter()
    .collect()
}
