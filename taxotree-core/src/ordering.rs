//! Child-ordering façade
//!
//! Applies a desired sibling permutation by repeated repositioning. Each
//! reposition is its own atomic operation; there is no transaction spanning
//! the whole permutation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, TreeError};
use crate::node::NodeId;
use crate::store::RowStore;
use crate::tree::NestedSetTree;

impl<S: RowStore> NestedSetTree<S> {
    /// Reorder the direct children of `parent_id` to match
    /// `ordered_child_ids`.
    ///
    /// Every id must currently be a direct child of `parent_id`; otherwise
    /// the call fails with `InvalidArgument` before anything moves.
    pub fn apply_sort_order_of_children(
        &self,
        parent_id: NodeId,
        ordered_child_ids: &[NodeId],
    ) -> Result<()> {
        let children: HashSet<NodeId> = self
            .children(parent_id)?
            .into_iter()
            .map(|c| c.id)
            .collect();
        for id in ordered_child_ids {
            if !children.contains(id) {
                return Err(TreeError::InvalidArgument(format!(
                    "node {} is not a child of {}",
                    id, parent_id
                )));
            }
        }
        for (index, id) in ordered_child_ids.iter().enumerate() {
            self.move_to_position(*id, index)?;
        }
        debug!(%parent_id, count = ordered_child_ids.len(), "applied child sort order");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryNodeStore;
    use crate::node::TreeId;

    fn engine_with_children(n: usize) -> (NestedSetTree<MemoryNodeStore>, Vec<NodeId>) {
        let tree = NestedSetTree::new(MemoryNodeStore::new());
        let root = tree.create_root(TreeId::Institute, NodeId(1)).unwrap();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = NodeId(10 + i as i64);
            tree.insert_last_child(id, root.id).unwrap();
            ids.push(id);
        }
        (tree, ids)
    }

    fn child_ids(tree: &NestedSetTree<MemoryNodeStore>) -> Vec<NodeId> {
        tree.children(NodeId(1))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    #[test]
    fn test_apply_sort_order_permutes_children() {
        let (tree, ids) = engine_with_children(3);
        let desired = vec![ids[2], ids[0], ids[1]];
        tree.apply_sort_order_of_children(NodeId(1), &desired).unwrap();
        assert_eq!(child_ids(&tree), desired);
    }

    #[test]
    fn test_apply_sort_order_identity_is_noop() {
        let (tree, ids) = engine_with_children(3);
        tree.apply_sort_order_of_children(NodeId(1), &ids).unwrap();
        assert_eq!(child_ids(&tree), ids);
    }

    #[test]
    fn test_apply_sort_order_rejects_foreign_id() {
        let (tree, mut ids) = engine_with_children(2);
        ids.push(NodeId(999));
        let err = tree
            .apply_sort_order_of_children(NodeId(1), &ids)
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidArgument(_)));
        // Nothing moved
        assert_eq!(child_ids(&tree), vec![NodeId(10), NodeId(11)]);
    }
}
