//! Physical table configuration
//!
//! The engine is parameterized by the physical table name and the column
//! names carrying the id/left/right/parent/tree/visible values, so the same
//! engine serves differently named legacy tables. The configuration is an
//! immutable value handed to the store at construction.

use crate::error::{Result, TreeError};

/// Names of the physical table and its columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeTableConfig {
    pub table: String,
    pub id_col: String,
    pub left_col: String,
    pub right_col: String,
    pub parent_col: String,
    pub tree_col: String,
    pub visible_col: String,
}

impl Default for TreeTableConfig {
    fn default() -> Self {
        Self {
            table: "tree_nodes".into(),
            id_col: "id".into(),
            left_col: "lft".into(),
            right_col: "rgt".into(),
            parent_col: "parent_id".into(),
            tree_col: "tree_id".into(),
            visible_col: "visible".into(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

impl TreeTableConfig {
    /// Reject names that cannot be spliced into SQL as bare identifiers
    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.table,
            &self.id_col,
            &self.left_col,
            &self.right_col,
            &self.parent_col,
            &self.tree_col,
            &self.visible_col,
        ];
        for name in names {
            if !is_identifier(name) {
                return Err(TreeError::InvalidArgument(format!(
                    "invalid table/column identifier: {:?}",
                    name
                )));
            }
        }
        Ok(())
    }
}
