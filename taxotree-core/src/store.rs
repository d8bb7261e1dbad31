//! Row store abstraction
//!
//! The engine issues all reads and writes through this interface so the
//! nested-set algorithms stay independent of the physical backend. The
//! predicate language is deliberately small: conjunctions of comparisons
//! against the five logical columns, which is all boundary arithmetic needs.

use crate::error::Result;
use crate::node::Node;

/// Logical columns of the node table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Col {
    Id,
    Left,
    Right,
    Parent,
    Tree,
}

/// Comparison operators usable in a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn matches(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Cmp::Eq => lhs == rhs,
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Gt => ">",
            Cmp::Ge => ">=",
        }
    }
}

/// One comparison against a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond {
    pub col: Col,
    pub cmp: Cmp,
    pub value: i64,
}

/// Conjunction of conditions selecting a set of rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conds: Vec<Cond>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of one tree
    pub fn tree(tree: crate::node::TreeId) -> Self {
        Self::new().and(Col::Tree, Cmp::Eq, tree.as_i64())
    }

    pub fn and(mut self, col: Col, cmp: Cmp, value: i64) -> Self {
        self.conds.push(Cond { col, cmp, value });
        self
    }

    pub fn conds(&self) -> &[Cond] {
        &self.conds
    }

    /// Evaluate against an in-memory row
    pub fn matches(&self, node: &Node) -> bool {
        self.conds.iter().all(|c| {
            let lhs = match c.col {
                Col::Id => node.id.as_i64(),
                Col::Left => node.left as i64,
                Col::Right => node.right as i64,
                Col::Parent => match node.parent {
                    Some(p) => p.as_i64(),
                    // parent IS NULL never equals a concrete id
                    None => return false,
                },
                Col::Tree => node.tree.as_i64(),
            };
            c.cmp.matches(lhs, c.value)
        })
    }
}

/// Order in which an ordered bulk update or delete visits the affected
/// boundary values.
///
/// When the backend enforces uniqueness on `(tree, left)` and
/// `(tree, right)`, a growing shift must visit the largest value first and a
/// shrinking shift the smallest first, so no intermediate state collides
/// with a not-yet-shifted row. Where the backend defers constraint checks
/// the order is still honored for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOrder {
    Ascending,
    Descending,
}

/// Generic node-row store interface
///
/// All backends must implement this trait.
pub trait RowStore {
    /// Select all rows matching the filter, in unspecified order
    fn select(&self, filter: &Filter) -> Result<Vec<Node>>;

    /// Insert one row
    fn insert(&self, node: &Node) -> Result<()>;

    /// Delete all rows matching the filter, visiting them in the given
    /// order of their `left` value; returns the number of rows removed
    fn delete(&self, filter: &Filter, order: ApplyOrder) -> Result<usize>;

    /// Raw set/where primitive: `col = col + delta` for every matching row,
    /// applied row-by-row in the given order of `col`; returns the number
    /// of rows updated
    fn shift(&self, col: Col, delta: i64, filter: &Filter, order: ApplyOrder) -> Result<usize>;

    /// Run `body` inside one transaction: all statements issued by the body
    /// commit together, and any error rolls the store back to the state
    /// before the call, rethrowing the body's error unchanged.
    fn transaction<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T>
    where
        Self: Sized;
}
