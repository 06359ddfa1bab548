//! Durable key-value storage primitive.
//!
//! Values are JSON documents. `set` writes all of its items atomically, so a
//! reader never sees half of a multi-key update.

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::schema;
use crate::{Error, Result};

pub trait Storage: Send + Sync {
    /// Fetch `keys`; absent keys are simply missing from the returned map.
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<HashMap<String, Value>>> + Send;

    fn set(&self, items: Vec<(String, Value)>) -> impl Future<Output = Result<()>> + Send;
}

/// Process-lifetime storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let entries = self.entries()?;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, items: Vec<(String, Value)>) -> Result<()> {
        self.entries()?.extend(items);
        Ok(())
    }
}

/// SQLite-backed storage: one `kv` row per key.
///
/// Statements run on tokio's blocking pool so a slow disk never stalls the
/// aggregator's executor thread.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        schema::init_schema(&conn)?;

        tracing::debug!(path = %path.display(), "opened sqlite storage");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|err| Error::Storage(format!("sqlite task failed: {}", err)))?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| Error::Storage("sqlite connection lock poisoned".to_string()))
}

fn read(conn: &Connection, keys: &[String]) -> Result<HashMap<String, Value>> {
    let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
    let mut found = HashMap::with_capacity(keys.len());
    for key in keys {
        let raw: Option<String> = stmt.query_row(params![key], |row| row.get(0)).optional()?;
        if let Some(raw) = raw {
            found.insert(key.clone(), serde_json::from_str(&raw)?);
        }
    }
    Ok(found)
}

fn write(conn: &mut Connection, items: &[(String, Value)]) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;
        for (key, value) in items {
            stmt.execute(params![key, serde_json::to_string(value)?])?;
        }
    }
    tx.commit()?;
    Ok(())
}

impl Storage for SqliteStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        self.with_conn(move |conn| read(conn, &keys)).await
    }

    async fn set(&self, items: Vec<(String, Value)>) -> Result<()> {
        self.with_conn(move |conn| write(conn, &items)).await
    }
}

/// Storage backend chosen at runtime from configuration
#[derive(Debug)]
pub enum AnyStorage {
    Memory(MemoryStorage),
    Sqlite(SqliteStorage),
}

impl AnyStorage {
    pub fn backend_name(&self) -> &'static str {
        match self {
            AnyStorage::Memory(_) => "memory",
            AnyStorage::Sqlite(_) => "sqlite",
        }
    }
}

impl From<MemoryStorage> for AnyStorage {
    fn from(storage: MemoryStorage) -> Self {
        AnyStorage::Memory(storage)
    }
}

impl From<SqliteStorage> for AnyStorage {
    fn from(storage: SqliteStorage) -> Self {
        AnyStorage::Sqlite(storage)
    }
}

impl Storage for AnyStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        match self {
            AnyStorage::Memory(storage) => storage.get(keys).await,
            AnyStorage::Sqlite(storage) => storage.get(keys).await,
        }
    }

    async fn set(&self, items: Vec<(String, Value)>) -> Result<()> {
        match self {
            AnyStorage::Memory(storage) => storage.set(items).await,
            AnyStorage::Sqlite(storage) => storage.set(items).await,
        }
    }
}
