//! Read-only boundary-arithmetic queries
//!
//! Subtree, ancestor and children lookups are pure range comparisons on the
//! `left`/`right` boundaries; none of them issues a transaction or touches
//! any row.

use crate::error::Result;
use crate::node::{Node, NodeId, TreeId};
use crate::store::{Cmp, Col, Filter, RowStore};
use crate::tree::NestedSetTree;

impl<S: RowStore> NestedSetTree<S> {
    /// Resolve a node by id, failing with `NotFound` when absent
    pub fn node(&self, id: NodeId) -> Result<Node> {
        self.repo.node(id)
    }

    /// The root of a tree, if the tree has any nodes
    pub fn root(&self, tree: TreeId) -> Result<Option<Node>> {
        self.repo.root(tree)
    }

    /// All nodes of the subtree rooted at `id`, including `id` itself,
    /// sorted by `left` ascending (depth-first traversal order)
    pub fn subtree(&self, id: NodeId) -> Result<Vec<Node>> {
        let node = self.repo.node(id)?;
        let filter = Filter::tree(node.tree)
            .and(Col::Left, Cmp::Ge, node.left as i64)
            .and(Col::Left, Cmp::Le, node.right as i64);
        let mut nodes = self.repo.select(&filter)?;
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }

    /// All ancestors of `id` including the node itself, deepest first
    /// (`left` descending). An ancestor is any node whose boundary range
    /// contains the target's `left`.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<Node>> {
        let node = self.repo.node(id)?;
        let filter = Filter::tree(node.tree)
            .and(Col::Left, Cmp::Le, node.left as i64)
            .and(Col::Right, Cmp::Ge, node.left as i64);
        let mut nodes = self.repo.select(&filter)?;
        nodes.sort_by_key(|n| std::cmp::Reverse(n.left));
        Ok(nodes)
    }

    /// Direct children of `id`, in sibling order (`left` ascending)
    pub fn children(&self, id: NodeId) -> Result<Vec<Node>> {
        let filter = Filter::new().and(Col::Parent, Cmp::Eq, id.as_i64());
        let mut nodes = self.repo.select(&filter)?;
        nodes.sort_by_key(|n| n.left);
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryNodeStore;

    /// root(1,8) -> a(2,5) -> aa(3,4), b(6,7)
    fn fixture() -> NestedSetTree<MemoryNodeStore> {
        let tree = NestedSetTree::new(MemoryNodeStore::new());
        let rows = [
            (1, 1, 8, None),
            (2, 2, 5, Some(1)),
            (3, 3, 4, Some(2)),
            (4, 6, 7, Some(1)),
        ];
        for (id, left, right, parent) in rows {
            tree.repository()
                .insert(&Node {
                    id: NodeId(id),
                    tree: TreeId::Institute,
                    left,
                    right,
                    parent: parent.map(NodeId),
                    visible: true,
                })
                .unwrap();
        }
        tree
    }

    #[test]
    fn test_subtree_includes_self_in_traversal_order() {
        let tree = fixture();
        let sub = tree.subtree(NodeId(2)).unwrap();
        let ids: Vec<i64> = sub.iter().map(|n| n.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 3]);

        let all = tree.subtree(NodeId(1)).unwrap();
        let ids: Vec<i64> = all.iter().map(|n| n.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ancestors_deepest_first() {
        let tree = fixture();
        let up = tree.ancestors(NodeId(3)).unwrap();
        let ids: Vec<i64> = up.iter().map(|n| n.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_children_in_sibling_order() {
        let tree = fixture();
        let kids = tree.children(NodeId(1)).unwrap();
        let ids: Vec<i64> = kids.iter().map(|n| n.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(tree.children(NodeId(3)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_node_is_not_found() {
        let tree = fixture();
        assert!(tree.subtree(NodeId(99)).is_err());
    }
}
