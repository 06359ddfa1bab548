use logtailer_types::{TabId, TabInfo};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Platform tab metadata accessor
pub trait TabDirectory: Send + Sync {
    /// Current metadata for `tab_id`; unknown tabs get a bare record.
    fn tab_info(&self, tab_id: TabId) -> TabInfo;
}

impl<T: TabDirectory + ?Sized> TabDirectory for Arc<T> {
    fn tab_info(&self, tab_id: TabId) -> TabInfo {
        (**self).tab_info(tab_id)
    }
}

/// In-process registry of open tabs
#[derive(Debug)]
pub struct BrowserTabs {
    tabs: RwLock<BTreeMap<TabId, TabInfo>>,
    next_id: AtomicU32,
}

impl Default for BrowserTabs {
    fn default() -> Self {
        Self {
            tabs: RwLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(1),
        }
    }
}

impl BrowserTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab and return its freshly assigned id.
    pub fn open(&self, title: Option<&str>, fav_icon_url: Option<&str>) -> TabId {
        let id = TabId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let info = TabInfo {
            id,
            title: title.map(str::to_string),
            fav_icon_url: fav_icon_url.map(str::to_string),
        };
        self.update(info);
        id
    }

    /// Make sure ids handed out from now on are above `last`.
    ///
    /// Stored logs outlive the process while the id counter does not, so the
    /// host resumes after the highest id it finds in storage. A new page
    /// then never lands in an earlier session's tab.
    pub fn resume_after(&self, last: TabId) {
        self.next_id
            .fetch_max(last.0.saturating_add(1), Ordering::Relaxed);
    }

    /// Insert or overwrite a tab's metadata (navigation, title change).
    pub fn update(&self, info: TabInfo) {
        let mut tabs = self.tabs.write().unwrap_or_else(PoisonError::into_inner);
        tabs.insert(info.id, info);
    }

    pub fn close(&self, tab_id: TabId) -> Option<TabInfo> {
        let mut tabs = self.tabs.write().unwrap_or_else(PoisonError::into_inner);
        tabs.remove(&tab_id)
    }

    pub fn get(&self, tab_id: TabId) -> Option<TabInfo> {
        let tabs = self.tabs.read().unwrap_or_else(PoisonError::into_inner);
        tabs.get(&tab_id).cloned()
    }

    pub fn list(&self) -> Vec<TabInfo> {
        let tabs = self.tabs.read().unwrap_or_else(PoisonError::into_inner);
        tabs.values().cloned().collect()
    }
}

impl TabDirectory for BrowserTabs {
    fn tab_info(&self, tab_id: TabId) -> TabInfo {
        self.get(tab_id).unwrap_or_else(|| TabInfo::new(tab_id))
    }
}
