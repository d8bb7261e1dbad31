//! Node model for nested-set trees
//!
//! Every tree element is one row carrying a `left`/`right` boundary pair.
//! Containment between boundary ranges encodes the ancestor/descendant
//! relationship, so subtree and ancestor queries need no recursive joins.

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Unique identifier of a node row within the physical table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl NodeId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminator separating the independent trees sharing one table.
///
/// The institute hierarchy is a distinguished tree; all subject and
/// collection hierarchies carry a numeric classification id. Modelled as a
/// tagged identifier rather than a loose string-or-integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeId {
    /// The institute hierarchy
    Institute,
    /// A subject/collection hierarchy (id >= 1)
    Classification(u32),
}

impl TreeId {
    /// Column encoding: institute tree is 0, classifications keep their id
    pub fn as_i64(&self) -> i64 {
        match self {
            TreeId::Institute => 0,
            TreeId::Classification(n) => *n as i64,
        }
    }

    /// Decode the column value; anything outside `0..=u32::MAX` is corrupt
    pub fn from_i64(value: i64) -> Result<Self, TreeError> {
        match value {
            0 => Ok(TreeId::Institute),
            n if n > 0 && n <= u32::MAX as i64 => Ok(TreeId::Classification(n as u32)),
            other => Err(TreeError::Storage(format!(
                "invalid tree id column value: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeId::Institute => write!(f, "institute"),
            TreeId::Classification(n) => write!(f, "classification:{}", n),
        }
    }
}

/// One row of a nested-set tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Row identifier
    pub id: NodeId,
    /// Which tree this row belongs to
    pub tree: TreeId,
    /// Lower boundary; the root of a tree has `left == 1`
    pub left: u32,
    /// Upper boundary, strictly greater than `left`
    pub right: u32,
    /// Immediate parent, absent only for the root
    pub parent: Option<NodeId>,
    /// Display flag, orthogonal to structure
    pub visible: bool,
}

impl Node {
    /// A root carries the lower bound of the whole tree
    pub fn is_root(&self) -> bool {
        self.left == 1
    }

    /// A leaf spans exactly one boundary slot pair
    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    /// Number of boundary slots the subtree occupies
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(left: u32, right: u32) -> Node {
        Node {
            id: NodeId(1),
            tree: TreeId::Institute,
            left,
            right,
            parent: None,
            visible: true,
        }
    }

    #[test]
    fn test_root_and_leaf_predicates() {
        let root = node(1, 6);
        assert!(root.is_root());
        assert!(!root.is_leaf());

        let leaf = node(2, 3);
        assert!(!leaf.is_root());
        assert!(leaf.is_leaf());
    }

    #[test]
    fn test_subtree_width() {
        assert_eq!(node(2, 3).width(), 2);
        assert_eq!(node(1, 6).width(), 6);
    }

    #[test]
    fn test_tree_id_encoding_round_trip() {
        assert_eq!(TreeId::Institute.as_i64(), 0);
        assert_eq!(TreeId::from_i64(0).unwrap(), TreeId::Institute);
        assert_eq!(
            TreeId::from_i64(42).unwrap(),
            TreeId::Classification(42)
        );
        assert!(TreeId::from_i64(-1).is_err());
    }
}
