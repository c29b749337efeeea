//! SQLite-backed [`ParentStore`].
//!
//! Documents are stored as JSON in a single `docs(k, v)` table. All SQLite
//! work runs on the blocking thread pool.
//!
//! Enabled with the `sqlite` cargo feature.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use crate::document::Document;
use crate::error::{RagError, Result};
use crate::parent::ParentStore;

const BACKEND: &str = "sqlite";

fn store_err(message: impl Display) -> RagError {
    RagError::ParentStore { backend: BACKEND.to_string(), message: message.to_string() }
}

fn encode(doc: &Document) -> Result<String> {
    serde_json::to_string(doc).map_err(|e| store_err(format!("failed to encode document: {e}")))
}

fn decode(raw: &str) -> Result<Document> {
    serde_json::from_str(raw).map_err(|e| store_err(format!("failed to decode document: {e}")))
}

/// A [`ParentStore`] persisted in a SQLite database file.
#[derive(Clone)]
pub struct SqliteParentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteParentStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ParentStore`] if the database cannot be opened or
    /// the table cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(store_err)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS docs (k TEXT PRIMARY KEY, v TEXT NOT NULL)",
            [],
        )
        .map_err(store_err)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| store_err("connection lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| store_err(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl ParentStore for SqliteParentStore {
    async fn batch_get(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!("SELECT k, v FROM docs WHERE k IN ({placeholders})");
            let mut stmt = conn.prepare(&sql).map_err(store_err)?;
            let rows = stmt
                .query_map(params_from_iter(ids.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(store_err)?;

            let mut found: HashMap<String, String> = HashMap::new();
            for row in rows {
                let (k, v) = row.map_err(store_err)?;
                found.insert(k, v);
            }
            debug!(requested = ids.len(), found = found.len(), "sqlite batch get");

            ids.iter().map(|id| found.get(id).map(|raw| decode(raw)).transpose()).collect()
        })
        .await
    }

    async fn put_many(&self, entries: Vec<(String, Document)>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(store_err)?;
            {
                let mut stmt = tx
                    .prepare("INSERT OR REPLACE INTO docs (k, v) VALUES (?1, ?2)")
                    .map_err(store_err)?;
                for (k, doc) in &entries {
                    stmt.execute(params![k, encode(doc)?]).map_err(store_err)?;
                }
            }
            tx.commit().map_err(store_err)
        })
        .await
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!("DELETE FROM docs WHERE k IN ({placeholders})");
            conn.execute(&sql, params_from_iter(ids.iter())).map_err(store_err)?;
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT k FROM docs").map_err(store_err)?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(store_err)?;
            rows.map(|row| row.map_err(store_err)).collect()
        })
        .await
    }

    fn name(&self) -> &str {
        BACKEND
    }
}
