//! SQLite-backed row store
//!
//! Persists node rows in an SQLite table with WAL mode. The schema enforces
//! uniqueness on `(tree, left)` and `(tree, right)`, so the ordered shift
//! primitive visits rows one at a time in boundary order; a bulk `UPDATE`
//! would trip the constraint on intermediate states.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::TreeTableConfig;
use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, TreeId};
use crate::store::{ApplyOrder, Col, Filter, RowStore};

fn db_err(what: &str, e: rusqlite::Error) -> TreeError {
    TreeError::Storage(format!("{}: {}", what, e))
}

/// SQLite-backed node store
pub struct SqliteNodeStore {
    conn: Mutex<Connection>,
    config: TreeTableConfig,
}

impl SqliteNodeStore {
    /// Open or create the node table in a database file
    pub fn open(path: &Path, config: TreeTableConfig) -> Result<Self> {
        config.validate()?;
        let conn = Connection::open(path)
            .map_err(|e| db_err("failed to open database", e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| db_err("failed to set WAL mode", e))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| db_err("failed to set synchronous mode", e))?;
        conn.pragma_update(None, "cache_size", "-64000")
            .map_err(|e| db_err("failed to set cache size", e))?;
        conn.pragma_update(None, "temp_store", "MEMORY")
            .map_err(|e| db_err("failed to set temp store", e))?;
        Self::with_connection(conn, config)
    }

    /// Open an in-memory database, mostly for tests
    pub fn open_in_memory(config: TreeTableConfig) -> Result<Self> {
        config.validate()?;
        let conn = Connection::open_in_memory()
            .map_err(|e| db_err("failed to open in-memory database", e))?;
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: TreeTableConfig) -> Result<Self> {
        let c = &config;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                {id} INTEGER PRIMARY KEY,
                {tree} INTEGER NOT NULL,
                {lft} INTEGER NOT NULL,
                {rgt} INTEGER NOT NULL,
                {parent} INTEGER,
                {visible} INTEGER NOT NULL DEFAULT 1,
                UNIQUE ({tree}, {lft}),
                UNIQUE ({tree}, {rgt})
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_parent ON {table} ({parent});",
            table = c.table,
            id = c.id_col,
            tree = c.tree_col,
            lft = c.left_col,
            rgt = c.right_col,
            parent = c.parent_col,
            visible = c.visible_col,
        ))
        .map_err(|e| db_err("failed to create node table", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn col_name(&self, col: Col) -> &str {
        match col {
            Col::Id => &self.config.id_col,
            Col::Left => &self.config.left_col,
            Col::Right => &self.config.right_col,
            Col::Parent => &self.config.parent_col,
            Col::Tree => &self.config.tree_col,
        }
    }

    /// Render the filter as a WHERE clause plus its parameter list
    fn where_clause(&self, filter: &Filter) -> (String, Vec<i64>) {
        if filter.conds().is_empty() {
            return ("1=1".to_string(), Vec::new());
        }
        let mut clauses = Vec::with_capacity(filter.conds().len());
        let mut params = Vec::with_capacity(filter.conds().len());
        for cond in filter.conds() {
            clauses.push(format!("{} {} ?", self.col_name(cond.col), cond.cmp.sql()));
            params.push(cond.value);
        }
        (clauses.join(" AND "), params)
    }

    fn row_to_node(&self, row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, i64, i64, i64, Option<i64>, i64)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    /// Ids of matching rows, ordered by the given column
    fn ordered_ids(&self, by: Col, filter: &Filter, order: ApplyOrder) -> Result<Vec<i64>> {
        let (where_sql, params) = self.where_clause(filter);
        let dir = match order {
            ApplyOrder::Ascending => "ASC",
            ApplyOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {id} FROM {table} WHERE {w} ORDER BY {by} {dir}",
            id = self.config.id_col,
            table = self.config.table,
            w = where_sql,
            by = self.col_name(by),
            dir = dir,
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| db_err("failed to prepare id select", e))?;
        let ids = stmt
            .query_map(rusqlite::params_from_iter(params), |row| row.get(0))
            .map_err(|e| db_err("id select failed", e))?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .map_err(|e| db_err("id select failed", e))?;
        Ok(ids)
    }
}

impl RowStore for SqliteNodeStore {
    fn select(&self, filter: &Filter) -> Result<Vec<Node>> {
        let (where_sql, params) = self.where_clause(filter);
        let c = &self.config;
        let sql = format!(
            "SELECT {id}, {tree}, {lft}, {rgt}, {parent}, {visible} FROM {table} WHERE {w}",
            id = c.id_col,
            tree = c.tree_col,
            lft = c.left_col,
            rgt = c.right_col,
            parent = c.parent_col,
            visible = c.visible_col,
            table = c.table,
            w = where_sql,
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| db_err("failed to prepare select", e))?;
        let raw = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                self.row_to_node(row)
            })
            .map_err(|e| db_err("select failed", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("select failed", e))?;
        let mut nodes = Vec::with_capacity(raw.len());
        for (id, tree, left, right, parent, visible) in raw {
            nodes.push(Node {
                id: NodeId(id),
                tree: TreeId::from_i64(tree)?,
                left: left as u32,
                right: right as u32,
                parent: parent.map(NodeId),
                visible: visible != 0,
            });
        }
        Ok(nodes)
    }

    fn insert(&self, node: &Node) -> Result<()> {
        let c = &self.config;
        let sql = format!(
            "INSERT INTO {table} ({id}, {tree}, {lft}, {rgt}, {parent}, {visible}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table = c.table,
            id = c.id_col,
            tree = c.tree_col,
            lft = c.left_col,
            rgt = c.right_col,
            parent = c.parent_col,
            visible = c.visible_col,
        );
        self.conn()
            .execute(
                &sql,
                rusqlite::params![
                    node.id.as_i64(),
                    node.tree.as_i64(),
                    node.left as i64,
                    node.right as i64,
                    node.parent.map(|p| p.as_i64()),
                    node.visible as i64,
                ],
            )
            .map_err(|e| db_err("insert failed", e))?;
        Ok(())
    }

    fn delete(&self, filter: &Filter, order: ApplyOrder) -> Result<usize> {
        let ids = self.ordered_ids(Col::Left, filter, order)?;
        let sql = format!(
            "DELETE FROM {table} WHERE {id} = ?1",
            table = self.config.table,
            id = self.config.id_col,
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| db_err("failed to prepare delete", e))?;
        for id in &ids {
            stmt.execute(rusqlite::params![id])
                .map_err(|e| db_err("delete failed", e))?;
        }
        Ok(ids.len())
    }

    fn shift(&self, col: Col, delta: i64, filter: &Filter, order: ApplyOrder) -> Result<usize> {
        if !matches!(col, Col::Left | Col::Right) {
            return Err(TreeError::Storage(format!(
                "shift on non-boundary column {:?}",
                col
            )));
        }
        let ids = self.ordered_ids(col, filter, order)?;
        let sql = format!(
            "UPDATE {table} SET {col} = {col} + ?1 WHERE {id} = ?2",
            table = self.config.table,
            col = self.col_name(col),
            id = self.config.id_col,
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| db_err("failed to prepare shift", e))?;
        for id in &ids {
            stmt.execute(rusqlite::params![delta, id])
                .map_err(|e| db_err("shift failed", e))?;
        }
        Ok(ids.len())
    }

    fn transaction<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        self.conn()
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| db_err("failed to begin transaction", e))?;
        match body() {
            Ok(value) => {
                self.conn()
                    .execute_batch("COMMIT")
                    .map_err(|e| db_err("commit failed", e))?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn().execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}
