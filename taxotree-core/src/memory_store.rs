//! In-memory row store
//!
//! Backs the engine with a plain id-keyed map. Mainly used by tests and as
//! a staging target when migrating legacy per-tree tables, where the whole
//! structure is loaded, rewritten and bulk-inserted into the real store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId};
use crate::store::{ApplyOrder, Col, Filter, RowStore};

/// In-memory node store
pub struct MemoryNodeStore {
    rows: Mutex<HashMap<NodeId, Node>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<NodeId, Node>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn col_value(node: &Node, col: Col) -> i64 {
        match col {
            Col::Id => node.id.as_i64(),
            Col::Left => node.left as i64,
            Col::Right => node.right as i64,
            Col::Parent => node.parent.map(|p| p.as_i64()).unwrap_or(-1),
            Col::Tree => node.tree.as_i64(),
        }
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore for MemoryNodeStore {
    fn select(&self, filter: &Filter) -> Result<Vec<Node>> {
        Ok(self
            .rows()
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect())
    }

    fn insert(&self, node: &Node) -> Result<()> {
        let mut rows = self.rows();
        if rows.contains_key(&node.id) {
            return Err(TreeError::Storage(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        // Mirror the uniqueness the SQLite schema enforces on boundaries
        for other in rows.values() {
            if other.tree == node.tree && (other.left == node.left || other.right == node.right) {
                return Err(TreeError::Storage(format!(
                    "boundary collision inserting node {} into {}",
                    node.id, node.tree
                )));
            }
        }
        rows.insert(node.id, node.clone());
        Ok(())
    }

    fn delete(&self, filter: &Filter, order: ApplyOrder) -> Result<usize> {
        let mut rows = self.rows();
        let mut victims: Vec<(u32, NodeId)> = rows
            .values()
            .filter(|n| filter.matches(n))
            .map(|n| (n.left, n.id))
            .collect();
        victims.sort();
        if order == ApplyOrder::Descending {
            victims.reverse();
        }
        for (_, id) in &victims {
            rows.remove(id);
        }
        Ok(victims.len())
    }

    fn shift(&self, col: Col, delta: i64, filter: &Filter, order: ApplyOrder) -> Result<usize> {
        let mut rows = self.rows();
        let mut targets: Vec<(i64, NodeId)> = rows
            .values()
            .filter(|n| filter.matches(n))
            .map(|n| (Self::col_value(n, col), n.id))
            .collect();
        targets.sort();
        if order == ApplyOrder::Descending {
            targets.reverse();
        }
        for (value, id) in &targets {
            let shifted = value + delta;
            if shifted < 0 {
                return Err(TreeError::Storage(format!(
                    "boundary underflow shifting node {} by {}",
                    id, delta
                )));
            }
            let node = rows.get_mut(id).ok_or_else(|| {
                TreeError::Storage(format!("node {} vanished during shift", id))
            })?;
            match col {
                Col::Left => node.left = shifted as u32,
                Col::Right => node.right = shifted as u32,
                other => {
                    return Err(TreeError::Storage(format!(
                        "shift on non-boundary column {:?}",
                        other
                    )))
                }
            }
        }
        Ok(targets.len())
    }

    fn transaction<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        let snapshot = self.rows().clone();
        match body() {
            Ok(value) => Ok(value),
            Err(err) => {
                *self.rows() = snapshot;
                Err(err)
            }
        }
    }
}
