//! Taxotree Core Library
//!
//! Nested-set tree engine for hierarchical classification structures:
//! - Node model with tagged tree identifiers (institute vs. classification)
//! - Row store abstraction with SQLite and in-memory backends
//! - Boundary-arithmetic queries (subtree, ancestors, children, root)
//! - Structural mutations (four insertion points, subtree deletion,
//!   sibling swap, position-based move), each atomic
//! - Child-ordering façade
//!
//! Every tree element carries a `left`/`right` boundary pair; containment
//! between boundary ranges encodes ancestry, so subtree and ancestor
//! queries need no recursive joins. The price is that every structural
//! mutation renumbers boundaries across the whole tree. The engine runs
//! each mutation in one transaction but brings no lock manager of its own;
//! callers serialize structural writes per tree.

pub mod config;
pub mod error;
pub mod memory_store;
pub mod node;
pub mod repository;
pub mod sqlite_store;
pub mod store;
pub mod tree;

mod mutate;
mod ordering;
mod query;

pub use config::TreeTableConfig;
pub use error::{Result, TreeError};
pub use memory_store::MemoryNodeStore;
pub use node::{Node, NodeId, TreeId};
pub use repository::NodeRepository;
pub use sqlite_store::SqliteNodeStore;
pub use store::{ApplyOrder, Cmp, Col, Cond, Filter, RowStore};
pub use tree::NestedSetTree;
