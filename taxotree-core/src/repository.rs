//! Node repository
//!
//! Thin translation layer between the tree algorithms and the row store:
//! resolves nodes and roots, and issues the ordered boundary shifts the
//! mutation engine needs. The apply order is derived from the shift
//! direction, which is what keeps intermediate states clear of the
//! boundary uniqueness constraints.

use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, TreeId};
use crate::store::{ApplyOrder, Cmp, Col, Filter, RowStore};

/// Repository over a row store
pub struct NodeRepository<S: RowStore> {
    store: S,
}

impl<S: RowStore> NodeRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a node, failing when it is absent
    pub fn node(&self, id: NodeId) -> Result<Node> {
        self.find(id)?
            .ok_or_else(|| TreeError::NotFound(format!("node {}", id)))
    }

    /// Resolve a node that may be absent
    pub fn find(&self, id: NodeId) -> Result<Option<Node>> {
        let filter = Filter::new().and(Col::Id, Cmp::Eq, id.as_i64());
        let mut rows = self.store.select(&filter)?;
        if rows.len() > 1 {
            return Err(TreeError::Storage(format!("duplicate rows for node {}", id)));
        }
        Ok(rows.pop())
    }

    /// The root of a tree is the node with `left = 1`
    pub fn root(&self, tree: TreeId) -> Result<Option<Node>> {
        let filter = Filter::tree(tree).and(Col::Left, Cmp::Eq, 1);
        let mut rows = self.store.select(&filter)?;
        if rows.len() > 1 {
            return Err(TreeError::Storage(format!("multiple roots in tree {}", tree)));
        }
        Ok(rows.pop())
    }

    pub fn select(&self, filter: &Filter) -> Result<Vec<Node>> {
        self.store.select(filter)
    }

    pub fn insert(&self, node: &Node) -> Result<()> {
        self.store.insert(node)
    }

    /// Delete matching rows, largest `left` first
    pub fn delete(&self, filter: &Filter) -> Result<usize> {
        self.store.delete(filter, ApplyOrder::Descending)
    }

    /// Shift one boundary column of every node in `tree` whose `col`
    /// compares `cmp` against `pivot`.
    ///
    /// Growing shifts visit the largest boundary first, shrinking shifts
    /// the smallest first.
    pub fn shift_boundary(
        &self,
        tree: TreeId,
        col: Col,
        cmp: Cmp,
        pivot: u32,
        delta: i64,
    ) -> Result<usize> {
        let filter = Filter::tree(tree).and(col, cmp, pivot as i64);
        let order = if delta >= 0 {
            ApplyOrder::Descending
        } else {
            ApplyOrder::Ascending
        };
        self.store.shift(col, delta, &filter, order)
    }

    /// Translate both boundaries of every node of `tree` whose boundaries
    /// lie inside `[low, high]` by `offset`. Used to move a whole subtree
    /// into a previously opened gap.
    pub fn translate_range(&self, tree: TreeId, low: u32, high: u32, offset: i64) -> Result<usize> {
        let order = if offset >= 0 {
            ApplyOrder::Descending
        } else {
            ApplyOrder::Ascending
        };
        // Rights first so the left-based range stays intact for the second
        // update; every subtree boundary lies inside [low, high].
        let rights = Filter::tree(tree)
            .and(Col::Right, Cmp::Ge, low as i64)
            .and(Col::Right, Cmp::Le, high as i64);
        self.store.shift(Col::Right, offset, &rights, order)?;
        let lefts = Filter::tree(tree)
            .and(Col::Left, Cmp::Ge, low as i64)
            .and(Col::Left, Cmp::Le, high as i64);
        self.store.shift(Col::Left, offset, &lefts, order)
    }

    pub fn transaction<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        self.store.transaction(body)
    }
}
