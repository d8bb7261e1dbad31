//! Structural mutations
//!
//! Insertion, deletion and repositioning of subtrees. Every operation runs
//! inside one store transaction and issues its boundary shifts in a fixed
//! order: growing shifts visit the largest boundary first, shrinking shifts
//! the smallest first. With uniqueness enforced on `(tree, left)` and
//! `(tree, right)` that order is a correctness requirement, not a
//! preference; no intermediate state may collide with an unshifted row.
//!
//! A mutation renumbers boundaries across the entire tree, so two
//! concurrent mutations on the same tree can corrupt it. Callers serialize
//! structural writes per tree; mutations on different trees are
//! independent.

use tracing::{debug, info};

use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, TreeId};
use crate::store::{Cmp, Col, Filter, RowStore};
use crate::tree::NestedSetTree;

impl<S: RowStore> NestedSetTree<S> {
    /// Create the root of a brand-new tree with boundaries `(1, 2)`
    pub fn create_root(&self, tree: TreeId, id: NodeId) -> Result<Node> {
        self.repo.transaction(|| {
            if self.repo.root(tree)?.is_some() {
                return Err(TreeError::Domain(format!("tree {} already has a root", tree)));
            }
            let node = Node {
                id,
                tree,
                left: 1,
                right: 2,
                parent: None,
                visible: true,
            };
            self.repo.insert(&node)?;
            info!(%tree, %id, "created tree root");
            Ok(node)
        })
    }

    /// Insert `id` as the first child of `parent_id`
    pub fn insert_first_child(&self, id: NodeId, parent_id: NodeId) -> Result<Node> {
        self.repo.transaction(|| {
            let parent = self.parent_for_insert(parent_id)?;
            let l = parent.left;
            self.open_gap(parent.tree, l, 2)?;
            let node = Node {
                id,
                tree: parent.tree,
                left: l + 1,
                right: l + 2,
                parent: Some(parent_id),
                visible: true,
            };
            self.repo.insert(&node)?;
            debug!(%id, %parent_id, left = node.left, "inserted first child");
            Ok(node)
        })
    }

    /// Insert `id` as the last child of `parent_id`
    pub fn insert_last_child(&self, id: NodeId, parent_id: NodeId) -> Result<Node> {
        self.repo.transaction(|| {
            let parent = self.parent_for_insert(parent_id)?;
            let r = parent.right;
            self.repo.shift_boundary(parent.tree, Col::Right, Cmp::Ge, r, 2)?;
            self.repo.shift_boundary(parent.tree, Col::Left, Cmp::Gt, r, 2)?;
            let node = Node {
                id,
                tree: parent.tree,
                left: r,
                right: r + 1,
                parent: Some(parent_id),
                visible: true,
            };
            self.repo.insert(&node)?;
            debug!(%id, %parent_id, left = node.left, "inserted last child");
            Ok(node)
        })
    }

    /// Insert `id` as the sibling immediately after `anchor_id`
    pub fn insert_next_sibling(&self, id: NodeId, anchor_id: NodeId) -> Result<Node> {
        self.repo.transaction(|| {
            let anchor = self.repo.node(anchor_id)?;
            if anchor.is_root() {
                return Err(TreeError::Domain("root can't have siblings".into()));
            }
            let r = anchor.right;
            self.open_gap(anchor.tree, r, 2)?;
            let node = Node {
                id,
                tree: anchor.tree,
                left: r + 1,
                right: r + 2,
                parent: anchor.parent,
                visible: true,
            };
            self.repo.insert(&node)?;
            debug!(%id, %anchor_id, left = node.left, "inserted next sibling");
            Ok(node)
        })
    }

    /// Insert `id` as the sibling immediately before `anchor_id`
    pub fn insert_prev_sibling(&self, id: NodeId, anchor_id: NodeId) -> Result<Node> {
        self.repo.transaction(|| {
            let anchor = self.repo.node(anchor_id)?;
            if anchor.is_root() {
                return Err(TreeError::Domain("root can't have siblings".into()));
            }
            let l = anchor.left;
            self.repo.shift_boundary(anchor.tree, Col::Right, Cmp::Gt, l, 2)?;
            self.repo.shift_boundary(anchor.tree, Col::Left, Cmp::Ge, l, 2)?;
            let node = Node {
                id,
                tree: anchor.tree,
                left: l,
                right: l + 1,
                parent: anchor.parent,
                visible: true,
            };
            self.repo.insert(&node)?;
            debug!(%id, %anchor_id, left = node.left, "inserted previous sibling");
            Ok(node)
        })
    }

    /// Remove the subtree rooted at `id`, returning the number of nodes
    /// removed
    pub fn delete_subtree(&self, id: NodeId) -> Result<usize> {
        self.repo.transaction(|| {
            let node = self.repo.node(id)?;
            let (l, r, w) = (node.left, node.right, node.width());
            let victims = Filter::tree(node.tree)
                .and(Col::Left, Cmp::Ge, l as i64)
                .and(Col::Left, Cmp::Le, r as i64);
            let removed = self.repo.delete(&victims)?;
            self.close_gap(node.tree, r, r, w)?;
            debug!(%id, removed, "deleted subtree");
            Ok(removed)
        })
    }

    /// Remove every node of a tree
    pub fn delete_tree(&self, tree: TreeId) -> Result<usize> {
        self.repo.transaction(|| {
            let removed = self.repo.delete(&Filter::tree(tree))?;
            info!(%tree, removed, "deleted tree");
            Ok(removed)
        })
    }

    /// Exchange the subtree rooted at `id` with its next sibling.
    ///
    /// Fails with `NotFound` when `id` is the last of its siblings.
    pub fn move_after_next_sibling(&self, id: NodeId) -> Result<()> {
        self.repo.transaction(|| {
            let node = self.repo.node(id)?;
            let next = self
                .next_sibling(&node)?
                .ok_or_else(|| TreeError::NotFound(format!("no next sibling of node {}", id)))?;
            let w = node.width();
            let next_right = next.right;
            // Gap after the next sibling, subtree in, gap at the old spot
            // out. The subtree's own boundaries lie below `next_right`, so
            // the first phase leaves them untouched.
            self.open_gap(node.tree, next_right, w)?;
            let offset = (next_right - node.left + 1) as i64;
            self.repo
                .translate_range(node.tree, node.left, node.right, offset)?;
            self.close_gap(node.tree, node.left, node.right, w)?;
            debug!(%id, next = %next.id, "swapped subtree with next sibling");
            Ok(())
        })
    }

    /// Exchange the subtree rooted at `id` with its previous sibling.
    ///
    /// Fails with `NotFound` when `id` is the first of its siblings.
    /// Moving the previous sibling forward past this node is the same
    /// pairwise swap seen from the other side.
    pub fn move_before_prev_sibling(&self, id: NodeId) -> Result<()> {
        let node = self.repo.node(id)?;
        let prev = self
            .prev_sibling(&node)?
            .ok_or_else(|| TreeError::NotFound(format!("no previous sibling of node {}", id)))?;
        self.move_after_next_sibling(prev.id)
    }

    /// Move the subtree rooted at `id` to the zero-based `position` among
    /// its current siblings. Positions at or beyond the sibling count mean
    /// "move to last"; moving to the current position is a no-op.
    pub fn move_to_position(&self, id: NodeId, position: usize) -> Result<()> {
        self.repo.transaction(|| {
            let node = self.repo.node(id)?;
            let parent_id = node
                .parent
                .ok_or_else(|| TreeError::Domain("root cannot be repositioned".into()))?;
            let siblings = self.children(parent_id)?;
            let current = siblings
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| {
                    TreeError::Storage(format!("node {} missing from its sibling list", id))
                })?;
            let index = position.min(siblings.len() - 1);
            let dest = &siblings[index];
            // Destination boundary: the designated sibling's left when the
            // subtree moves towards the front, the slot after it when it
            // moves towards the back. Compared against our own `left`
            // rather than against indices, so earlier shifts cannot fake a
            // difference.
            let target = if index <= current {
                dest.left
            } else {
                dest.right + 1
            };
            if target == node.left {
                return Ok(());
            }
            let w = node.width();
            self.open_gap(node.tree, target - 1, w)?;
            // A gap opened before the original position has already pushed
            // the subtree itself; correct its recorded boundaries first.
            let (src_left, src_right) = if target < node.left {
                (node.left + w, node.right + w)
            } else {
                (node.left, node.right)
            };
            let offset = target as i64 - src_left as i64;
            self.repo
                .translate_range(node.tree, src_left, src_right, offset)?;
            self.close_gap(node.tree, src_left, src_right, w)?;
            debug!(%id, position = index, "moved subtree to position");
            Ok(())
        })
    }

    /// Resolve the insertion parent; a missing parent is a structural
    /// error, not a plain lookup miss.
    fn parent_for_insert(&self, parent_id: NodeId) -> Result<Node> {
        self.repo.find(parent_id)?.ok_or_else(|| {
            TreeError::Domain(format!("parent {} not found for insertion", parent_id))
        })
    }

    /// The sibling with the smallest `left` beyond the node's own
    fn next_sibling(&self, node: &Node) -> Result<Option<Node>> {
        let Some(parent) = node.parent else {
            return Ok(None);
        };
        let filter = Filter::new()
            .and(Col::Parent, Cmp::Eq, parent.as_i64())
            .and(Col::Left, Cmp::Gt, node.left as i64);
        let siblings = self.repo.select(&filter)?;
        Ok(siblings.into_iter().min_by_key(|s| s.left))
    }

    /// The sibling with the largest `left` before the node's own
    fn prev_sibling(&self, node: &Node) -> Result<Option<Node>> {
        let Some(parent) = node.parent else {
            return Ok(None);
        };
        let filter = Filter::new()
            .and(Col::Parent, Cmp::Eq, parent.as_i64())
            .and(Col::Left, Cmp::Lt, node.left as i64);
        let siblings = self.repo.select(&filter)?;
        Ok(siblings.into_iter().max_by_key(|s| s.left))
    }

    /// Make room for `width` boundary slots immediately after `after`
    fn open_gap(&self, tree: TreeId, after: u32, width: u32) -> Result<()> {
        self.repo
            .shift_boundary(tree, Col::Right, Cmp::Gt, after, width as i64)?;
        self.repo
            .shift_boundary(tree, Col::Left, Cmp::Gt, after, width as i64)?;
        Ok(())
    }

    /// Reclaim the `width` slots of the vacated range `[left, right]`
    fn close_gap(&self, tree: TreeId, left: u32, right: u32, width: u32) -> Result<()> {
        self.repo
            .shift_boundary(tree, Col::Left, Cmp::Gt, left, -(width as i64))?;
        self.repo
            .shift_boundary(tree, Col::Right, Cmp::Gt, right, -(width as i64))?;
        Ok(())
    }
}
