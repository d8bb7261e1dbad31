//! Nested-set tree engine façade
//!
//! One engine instance serves every tree stored in the underlying table;
//! operations locate the tree through the node they are given. Read
//! operations live in [`crate::query`], structural mutations in
//! [`crate::mutate`], and the child-ordering façade in [`crate::ordering`].

use crate::repository::NodeRepository;
use crate::store::RowStore;

/// Nested-set tree engine over a row store
pub struct NestedSetTree<S: RowStore> {
    pub(crate) repo: NodeRepository<S>,
}

impl<S: RowStore> NestedSetTree<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: NodeRepository::new(store),
        }
    }

    /// The underlying repository, for collaborators that persist node
    /// attributes next to the structure
    pub fn repository(&self) -> &NodeRepository<S> {
        &self.repo
    }
}
