use nestree::domain::{DomainError, NestedNode, NestedSet, NodeId};
use nestree::util::testing::{init_test_setup, nested, sample_nested};
use rstest::rstest;

fn intervals(tree: &NestedSet) -> Vec<(NodeId, u64, u64)> {
    let mut sorted = tree.clone();
    sorted.sort();
    sorted.iter().map(|n| (n.id, n.left, n.right)).collect()
}

#[test]
fn given_loose_tree_when_tightening_then_minimal_contiguous_intervals() {
    init_test_setup();
    let mut tree = nested(&[(1, 10, 100), (2, 20, 40), (4, 25, 30), (3, 50, 90)]);

    tree.tighten().unwrap();

    assert_eq!(
        intervals(&tree),
        vec![(1, 1, 8), (2, 2, 5), (4, 3, 4), (3, 6, 7)]
    );
}

#[test]
fn given_tight_tree_when_tightening_then_unchanged() {
    init_test_setup();
    let mut tree = sample_nested();
    let before = intervals(&tree);

    tree.tighten().unwrap();

    assert_eq!(intervals(&tree), before);
}

#[test]
fn given_levels_when_tightening_then_levels_carried_over() {
    init_test_setup();
    let mut tree: NestedSet = [
        NestedNode::new(1, 5, 50).with_level(0),
        NestedNode::new(2, 10, 11).with_level(1),
    ]
    .into_iter()
    .collect();

    tree.tighten().unwrap();

    let child = tree.get_node(2).unwrap();
    assert_eq!((child.left, child.right, child.level), (2, 3, Some(1)));
}

#[test]
fn given_loose_forest_when_tightening_then_roots_numbered_in_sequence() {
    init_test_setup();
    let mut tree = nested(&[(7, 3, 9), (8, 40, 41), (9, 42, 60), (10, 43, 44)]);

    tree.tighten().unwrap();

    assert_eq!(
        intervals(&tree),
        vec![(7, 1, 2), (8, 3, 4), (9, 5, 8), (10, 6, 7)]
    );
}

#[rstest]
#[case(&[(1, 1, 5), (2, 3, 8)])]
#[case(&[(1, 1, 10), (2, 1, 4)])]
fn given_invalid_intervals_when_tightening_then_tree_untouched(#[case] triples: &[(NodeId, u64, u64)]) {
    init_test_setup();
    let mut tree = nested(triples);
    let before = intervals(&tree);

    let err = tree.tighten().unwrap_err();

    assert!(matches!(err, DomainError::InvalidTopology(_)));
    assert_eq!(intervals(&tree), before);
}

#[test]
fn given_tree_when_computing_tightened_then_original_kept() {
    init_test_setup();
    let tree = nested(&[(1, 2, 20), (2, 4, 6)]);

    let tightened = tree.tightened().unwrap();

    assert_eq!(intervals(&tightened), vec![(1, 1, 4), (2, 2, 3)]);
    assert_eq!(intervals(&tree), vec![(1, 2, 20), (2, 4, 6)]);
}
