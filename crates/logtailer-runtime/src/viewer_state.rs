//! Viewer-side state: the popup's model of the log store.
//!
//! Holds a local copy of the logs and tab metadata, kept current from the
//! initial snapshot, live pushes and clear acknowledgements, plus the level
//! and search filters applied to the active tab.

use chrono::{DateTime, SecondsFormat, Utc};
use logtailer_types::{
    Ack, LogEntry, LogLevel, LogSnapshot, Notification, TabId, TabInfo, TabInfos, TabLogs,
};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    levels: BTreeSet<LogLevel>,
    search: String,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            levels: LogLevel::ALL.into_iter().collect(),
            search: String::new(),
        }
    }
}

impl LogFilter {
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.levels = levels.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.set_search(search);
        self
    }

    pub fn set_level(&mut self, level: LogLevel, enabled: bool) {
        if enabled {
            self.levels.insert(level);
        } else {
            self.levels.remove(&level);
        }
    }

    /// Case-insensitive
    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_lowercase();
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    /// Search looks at the serialized message, so it also sees object keys
    /// and error stacks.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.is_enabled(entry.level) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        serde_json::to_string(&entry.message)
            .map(|text| text.to_lowercase().contains(&self.search))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    logs: TabLogs,
    tabs: TabInfos,
    active_tab: Option<TabId>,
    filter: LogFilter,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LogSnapshot) -> Self {
        let mut state = Self::new();
        state.apply_snapshot(snapshot);
        state
    }

    pub fn apply_snapshot(&mut self, snapshot: LogSnapshot) {
        self.logs = snapshot.logs;
        self.tabs = snapshot.tabs;
        self.ensure_active_tab();
    }

    /// A tab already known keeps the metadata it had.
    pub fn apply_notification(&mut self, notification: Notification) {
        match notification {
            Notification::NewLog(new_log) => {
                self.logs.entry(new_log.tab_id).or_default().push(new_log.log_entry);
                self.tabs.entry(new_log.tab_id).or_insert(new_log.tab_info);
            }
        }
        self.ensure_active_tab();
    }

    /// Apply the aggregator's answer to a clear-tab request.
    pub fn apply_tab_cleared(&mut self, ack: &Ack) {
        if let (true, Some(tab_id)) = (ack.success, ack.tab_id) {
            self.logs.insert(tab_id, Vec::new());
        }
    }

    pub fn apply_all_cleared(&mut self, ack: &Ack) {
        if ack.success {
            self.logs.clear();
            self.tabs.clear();
            self.active_tab = None;
        }
    }

    /// Tabs that currently have at least one entry, in id order.
    pub fn tabs_with_logs(&self) -> Vec<TabInfo> {
        self.logs
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(id, _)| self.tabs.get(id).cloned().unwrap_or_else(|| TabInfo::new(*id)))
            .collect()
    }

    /// Auto-select the first tab with logs when nothing is selected.
    pub fn ensure_active_tab(&mut self) -> Option<TabId> {
        if self.active_tab.is_none() {
            self.active_tab = self.tabs_with_logs().first().map(|tab| tab.id);
        }
        self.active_tab
    }

    pub fn select(&mut self, tab_id: TabId) {
        self.active_tab = Some(tab_id);
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active_tab
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut LogFilter {
        &mut self.filter
    }

    pub fn logs(&self) -> &TabLogs {
        &self.logs
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&TabInfo> {
        self.tabs.get(&tab_id)
    }

    /// Entries of the active tab that pass the filter.
    pub fn visible_entries(&self) -> Vec<&LogEntry> {
        let Some(entries) = self.active_tab.and_then(|id| self.logs.get(&id)) else {
            return Vec::new();
        };
        entries.iter().filter(|entry| self.filter.matches(entry)).collect()
    }

    /// The whole log mapping as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.logs)?)
    }
}

/// Render a serialized message the way the log list shows it.
pub fn format_message(message: &[Value]) -> String {
    message.iter().map(format_arg).collect::<Vec<_>>().join(" ")
}

fn format_arg(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        Value::Object(fields) if fields.get("isError") == Some(&Value::Bool(true)) => {
            let message = fields.get("message").and_then(Value::as_str).unwrap_or_default();
            let stack = fields.get("stack").and_then(Value::as_str).unwrap_or_default();
            format!("Error: {}\n{}", message, stack)
        }
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(arg).unwrap_or_else(|_| arg.to_string())
        }
        other => other.to_string(),
    }
}

/// `logtailer_export_<timestamp>.json`, with `:` swapped for `-` so the
/// name is valid on every filesystem.
pub fn default_export_filename(now: DateTime<Utc>) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true).replace(':', "-");
    format!("logtailer_export_{}.json", stamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use logtailer_types::NewLog;
    use serde_json::json;

    fn entry(level: LogLevel, message: Vec<Value>) -> LogEntry {
        LogEntry::new(level, message)
    }

    fn snapshot() -> LogSnapshot {
        let mut snapshot = LogSnapshot::default();
        snapshot.logs.insert(TabId(4), vec![
            entry(LogLevel::Info, vec![json!("user signed in"), json!({ "userId": 17 })]),
            entry(LogLevel::Error, vec![json!("Payment FAILED")]),
        ]);
        snapshot.logs.insert(TabId(2), vec![]);
        snapshot.tabs.insert(TabId(4), TabInfo::new(TabId(4)).with_title("Checkout"));
        snapshot
    }

    #[test]
    fn test_snapshot_selects_first_tab_with_logs() {
        let state = ViewerState::from_snapshot(snapshot());
        assert_eq!(state.active_tab(), Some(TabId(4)));
        assert_eq!(state.tabs_with_logs().len(), 1);
    }

    #[test]
    fn test_tab_without_metadata_falls_back_to_id_title() {
        let mut state = ViewerState::new();
        state.apply_notification(Notification::NewLog(NewLog {
            tab_id: TabId(8),
            log_entry: entry(LogLevel::Log, vec![json!("x")]),
            tab_info: TabInfo::new(TabId(8)),
        }));
        assert_eq!(state.tabs_with_logs()[0].display_title(), "Tab ID: 8");
    }

    #[test]
    fn test_push_keeps_known_metadata() {
        let mut state = ViewerState::from_snapshot(snapshot());
        state.apply_notification(Notification::NewLog(NewLog {
            tab_id: TabId(4),
            log_entry: entry(LogLevel::Warn, vec![json!("slow")]),
            tab_info: TabInfo::new(TabId(4)).with_title("Renamed"),
        }));

        assert_eq!(state.logs()[&TabId(4)].len(), 3);
        assert_eq!(state.tab(TabId(4)).unwrap().title.as_deref(), Some("Checkout"));
    }

    #[test]
    fn test_filters_by_level_and_case_insensitive_search() {
        let mut state = ViewerState::from_snapshot(snapshot());
        assert_eq!(state.visible_entries().len(), 2);

        state.filter_mut().set_search("payment failed");
        assert_eq!(state.visible_entries().len(), 1);

        state.filter_mut().set_level(LogLevel::Error, false);
        assert!(state.visible_entries().is_empty());

        state.filter_mut().set_level(LogLevel::Error, true);
        state.filter_mut().set_search("USERID");
        assert_eq!(state.visible_entries()[0].level, LogLevel::Info);
    }

    #[test]
    fn test_clear_acks_update_local_state() {
        let mut state = ViewerState::from_snapshot(snapshot());

        state.apply_tab_cleared(&Ack::tab_not_found(TabId(4)));
        assert_eq!(state.logs()[&TabId(4)].len(), 2);

        state.apply_tab_cleared(&Ack::tab_cleared(TabId(4)));
        assert!(state.logs()[&TabId(4)].is_empty());
        assert!(state.tab(TabId(4)).is_some());

        state.apply_all_cleared(&Ack::ok());
        assert!(state.logs().is_empty());
        assert_eq!(state.active_tab(), None);
    }

    #[test]
    fn test_format_message() {
        let text = format_message(&[
            json!("count"),
            json!(3),
            json!({ "message": "boom", "stack": "Error: boom\n  at f", "name": "Error", "isError": true }),
        ]);
        assert_eq!(text, "count 3 Error: boom\nError: boom\n  at f");

        assert_eq!(format_message(&[json!({ "a": 1 })]), "{\n  \"a\": 1\n}");
        assert_eq!(format_message(&[Value::Null, json!(false)]), "null false");
    }

    #[test]
    fn test_export_json_and_filename() {
        let state = ViewerState::from_snapshot(snapshot());
        let exported: Value = serde_json::from_str(&state.export_json().unwrap()).unwrap();
        assert_eq!(exported["4"][1]["message"], json!(["Payment FAILED"]));
        assert_eq!(exported["2"], json!([]));

        let now = Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap();
        assert_eq!(
            default_export_filename(now),
            "logtailer_export_2026-05-04T03-02-01.000Z.json"
        );
    }
}
