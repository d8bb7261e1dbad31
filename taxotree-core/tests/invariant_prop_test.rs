//! Property tests: structural invariants survive random operation sequences
//!
//! Drives the engine with arbitrary insert/delete/move sequences and checks
//! the nested-set invariants after every single operation. This is the
//! safety net for the move arithmetic, whose gap-direction adjustment is
//! easy to get subtly wrong.

use proptest::prelude::*;
use taxotree_core::{MemoryNodeStore, NestedSetTree, NodeId, TreeError, TreeId};

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone)]
enum Op {
    InsertFirstChild { anchor: usize },
    InsertLastChild { anchor: usize },
    InsertNextSibling { anchor: usize },
    InsertPrevSibling { anchor: usize },
    DeleteSubtree { anchor: usize },
    MoveToPosition { anchor: usize, position: usize },
    MoveAfterNext { anchor: usize },
    MoveBeforePrev { anchor: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..64).prop_map(|anchor| Op::InsertFirstChild { anchor }),
        (0usize..64).prop_map(|anchor| Op::InsertLastChild { anchor }),
        (0usize..64).prop_map(|anchor| Op::InsertNextSibling { anchor }),
        (0usize..64).prop_map(|anchor| Op::InsertPrevSibling { anchor }),
        (0usize..64).prop_map(|anchor| Op::DeleteSubtree { anchor }),
        (0usize..64, 0usize..8).prop_map(|(anchor, position)| Op::MoveToPosition {
            anchor,
            position
        }),
        (0usize..64).prop_map(|anchor| Op::MoveAfterNext { anchor }),
        (0usize..64).prop_map(|anchor| Op::MoveBeforePrev { anchor }),
    ]
}

fn check_invariants(tree: &NestedSetTree<MemoryNodeStore>, tid: TreeId) {
    let root = tree.root(tid).unwrap().expect("root is never deleted here");
    let nodes = tree.subtree(root.id).unwrap();

    assert_eq!(root.left, 1);
    assert_eq!(root.right as usize, 2 * nodes.len());

    let mut bounds: Vec<u32> = nodes.iter().flat_map(|n| [n.left, n.right]).collect();
    bounds.sort_unstable();
    let total = bounds.len();
    bounds.dedup();
    assert_eq!(bounds.len(), total, "duplicate boundary value");

    for n in &nodes {
        assert!(n.left < n.right);
        if let Some(pid) = n.parent {
            let p = nodes
                .iter()
                .find(|m| m.id == pid)
                .expect("parent row present");
            assert!(p.left < n.left && n.right < p.right, "containment violated");
        } else {
            assert_eq!(n.id, root.id);
        }
    }

    for a in &nodes {
        for b in &nodes {
            if a.id == b.id {
                continue;
            }
            let disjoint = a.right < b.left || b.right < a.left;
            let contains = (a.left < b.left && b.right < a.right)
                || (b.left < a.left && a.right < b.right);
            assert!(disjoint || contains, "partial range overlap");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_mutations_preserve_invariants(ops in prop::collection::vec(op_strategy(), 1..48)) {
        let tid = TreeId::Classification(1);
        let tree = NestedSetTree::new(MemoryNodeStore::new());
        tree.create_root(tid, ROOT).unwrap();
        let mut next_id = 1i64;

        for op in ops {
            let nodes = tree.subtree(ROOT).unwrap();
            let pick = |i: usize| nodes[i % nodes.len()].clone();
            match op {
                Op::InsertFirstChild { anchor } => {
                    tree.insert_first_child(NodeId(next_id), pick(anchor).id).unwrap();
                    next_id += 1;
                }
                Op::InsertLastChild { anchor } => {
                    tree.insert_last_child(NodeId(next_id), pick(anchor).id).unwrap();
                    next_id += 1;
                }
                Op::InsertNextSibling { anchor } => {
                    let anchor = pick(anchor);
                    let result = tree.insert_next_sibling(NodeId(next_id), anchor.id);
                    if anchor.is_root() {
                        prop_assert!(matches!(result, Err(TreeError::Domain(_))));
                    } else {
                        result.unwrap();
                        next_id += 1;
                    }
                }
                Op::InsertPrevSibling { anchor } => {
                    let anchor = pick(anchor);
                    let result = tree.insert_prev_sibling(NodeId(next_id), anchor.id);
                    if anchor.is_root() {
                        prop_assert!(matches!(result, Err(TreeError::Domain(_))));
                    } else {
                        result.unwrap();
                        next_id += 1;
                    }
                }
                Op::DeleteSubtree { anchor } => {
                    let anchor = pick(anchor);
                    if !anchor.is_root() {
                        tree.delete_subtree(anchor.id).unwrap();
                    }
                }
                Op::MoveToPosition { anchor, position } => {
                    let anchor = pick(anchor);
                    if !anchor.is_root() {
                        tree.move_to_position(anchor.id, position).unwrap();
                    }
                }
                Op::MoveAfterNext { anchor } => {
                    let anchor = pick(anchor);
                    if !anchor.is_root() {
                        // NotFound is legal for the last sibling
                        match tree.move_after_next_sibling(anchor.id) {
                            Ok(()) | Err(TreeError::NotFound(_)) => {}
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }
                Op::MoveBeforePrev { anchor } => {
                    let anchor = pick(anchor);
                    if !anchor.is_root() {
                        match tree.move_before_prev_sibling(anchor.id) {
                            Ok(()) | Err(TreeError::NotFound(_)) => {}
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }
            }
            check_invariants(&tree, tid);
        }
    }

    /// A subtree placed at position k is found at index k afterwards
    #[test]
    fn move_to_position_lands_at_index(count in 2usize..6, from in 0usize..6, to in 0usize..8) {
        let tid = TreeId::Institute;
        let tree = NestedSetTree::new(MemoryNodeStore::new());
        tree.create_root(tid, ROOT).unwrap();
        for i in 0..count {
            tree.insert_last_child(NodeId(1 + i as i64), ROOT).unwrap();
        }
        let from = from % count;
        let moved = NodeId(1 + from as i64);
        tree.move_to_position(moved, to).unwrap();

        let order: Vec<NodeId> = tree.children(ROOT).unwrap().iter().map(|n| n.id).collect();
        let expected_index = to.min(count - 1);
        prop_assert_eq!(order[expected_index], moved);
        check_invariants(&tree, tid);
    }
}
