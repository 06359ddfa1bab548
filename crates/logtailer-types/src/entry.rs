use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::LogLevel;

/// Browser tab identifier.
///
/// The platform reuses ids after a tab closes, so stored state for a closed
/// tab has to be purged rather than left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TabId {
    fn from(id: u32) -> Self {
        TabId(id)
    }
}

/// One captured console call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,

    /// Serialized call arguments, in call order
    pub message: Vec<serde_json::Value>,

    pub timestamp: DateTime<Utc>,

    /// Best-effort caller location; advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: Vec<serde_json::Value>) -> Self {
        Self {
            level,
            message,
            timestamp: Utc::now(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Last-known display metadata for a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
}

impl TabInfo {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            title: None,
            fav_icon_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_fav_icon_url(mut self, url: impl Into<String>) -> Self {
        self.fav_icon_url = Some(url.into());
        self
    }

    /// Title shown for the tab, falling back to its id.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("Tab ID: {}", self.id),
        }
    }
}

/// Tab id → captured entries, in capture order
pub type TabLogs = BTreeMap<TabId, Vec<LogEntry>>;

/// Tab id → last-known tab metadata
pub type TabInfos = BTreeMap<TabId, TabInfo>;

/// Full state image: what `GET_INITIAL_DATA` answers and what is persisted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogSnapshot {
    #[serde(default)]
    pub logs: TabLogs,

    #[serde(default)]
    pub tabs: TabInfos,
}

impl LogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.tabs.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.logs.values().map(Vec::len).sum()
    }
}
