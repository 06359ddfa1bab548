//! Per-tab log store.
//!
//! The state image lives under two storage keys: `logs` (tab id → ordered
//! entries) and `tabs` (tab id → metadata). Every mutation is one
//! read-modify-write of both keys, serialized by an async mutex so two
//! handlers never interleave between the read and the write.

use logtailer_types::{LogEntry, LogSnapshot, TabId, TabInfo, TabInfos, TabLogs};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::storage::Storage;
use crate::Result;

pub const KEY_LOGS: &str = "logs";
pub const KEY_TABS: &str = "tabs";

#[derive(Debug)]
pub struct LogStore<S> {
    storage: S,
    write_lock: Mutex<()>,
}

impl<S: Storage> LogStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Install hook: create empty `logs`/`tabs` entries where none exist.
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let found = self.storage.get(&[KEY_LOGS, KEY_TABS]).await?;

        let missing: Vec<(String, Value)> = [KEY_LOGS, KEY_TABS]
            .into_iter()
            .filter(|key| !found.contains_key(*key))
            .map(|key| (key.to_string(), Value::Object(Default::default())))
            .collect();

        if !missing.is_empty() {
            tracing::debug!(keys = missing.len(), "initializing empty log store");
            self.storage.set(missing).await?;
        }
        Ok(())
    }

    /// Append `entry` to its tab and upsert the tab's metadata.
    pub async fn record_log(&self, entry: LogEntry, tab: TabInfo) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load().await?;

        snapshot.logs.entry(tab.id).or_default().push(entry);
        snapshot.tabs.insert(tab.id, tab);

        self.persist(&snapshot).await
    }

    /// Reset one tab's entries, keeping its metadata.
    ///
    /// Returns `false` when nothing was ever recorded for the tab.
    pub async fn clear_tab(&self, tab_id: TabId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load().await?;

        let Some(entries) = snapshot.logs.get_mut(&tab_id) else {
            return Ok(false);
        };
        entries.clear();

        self.persist(&snapshot).await?;
        Ok(true)
    }

    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&LogSnapshot::default()).await
    }

    /// Forget a closed tab entirely. Removing an unknown tab is a no-op.
    pub async fn remove_tab(&self, tab_id: TabId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load().await?;

        let had_logs = snapshot.logs.remove(&tab_id).is_some();
        let had_info = snapshot.tabs.remove(&tab_id).is_some();
        if !had_logs && !had_info {
            return Ok(());
        }

        tracing::debug!(tab = %tab_id, "removed closed tab");
        self.persist(&snapshot).await
    }

    pub async fn get_all(&self) -> Result<LogSnapshot> {
        let _guard = self.write_lock.lock().await;
        self.load().await
    }

    pub async fn tab_count(&self) -> Result<usize> {
        Ok(self.get_all().await?.logs.len())
    }

    pub async fn entry_count(&self) -> Result<usize> {
        Ok(self.get_all().await?.entry_count())
    }

    async fn load(&self) -> Result<LogSnapshot> {
        let mut found = self.storage.get(&[KEY_LOGS, KEY_TABS]).await?;
        let logs: TabLogs = take_document(&mut found, KEY_LOGS)?;
        let tabs: TabInfos = take_document(&mut found, KEY_TABS)?;
        Ok(LogSnapshot { logs, tabs })
    }

    async fn persist(&self, snapshot: &LogSnapshot) -> Result<()> {
        self.storage
            .set(vec![
                (KEY_LOGS.to_string(), serde_json::to_value(&snapshot.logs)?),
                (KEY_TABS.to_string(), serde_json::to_value(&snapshot.tabs)?),
            ])
            .await
    }
}

fn take_document<T>(found: &mut HashMap<String, Value>, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match found.remove(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}
