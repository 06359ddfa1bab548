//! Host wiring for one extension instance.
//!
//! Pages live on the calling thread (their console and window are
//! single-threaded); the aggregator runs on its own tokio task and is only
//! reached through channels.

use logtailer_capture::{ConsoleOutput, Interceptor, Page, StderrOutput, WindowId};
use logtailer_store::{LogStore, Storage};
use logtailer_types::{TabId, TabInfo};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::aggregator::{Aggregator, AggregatorHandle};
use crate::config::Config;
use crate::tabs::BrowserTabs;
use crate::viewer::ViewerClient;
use crate::Result;

pub struct Extension {
    handle: AggregatorHandle,
    tabs: Arc<BrowserTabs>,
    interceptor: Interceptor,
    output: Rc<dyn ConsoleOutput>,
    pages: BTreeMap<TabId, Page>,
}

impl Extension {
    /// Open storage as configured, run the install hook and start the
    /// aggregator. Must be called inside a tokio runtime.
    pub async fn start(config: &Config, data_dir: &Path) -> Result<Self> {
        let storage = config.open_storage(data_dir)?;
        Self::with_storage(storage, config.interceptor()).await
    }

    pub async fn with_storage<S>(storage: S, interceptor: Interceptor) -> Result<Self>
    where
        S: Storage + 'static,
    {
        let store = LogStore::new(storage);
        store.initialize().await?;

        let tabs = Arc::new(BrowserTabs::new());
        let persisted = store.get_all().await?;
        if let Some(last) = persisted.logs.keys().chain(persisted.tabs.keys()).max() {
            tabs.resume_after(*last);
            tracing::debug!(last = %last, "resuming tab ids after stored tabs");
        }
        let handle = Aggregator::new(store, Arc::clone(&tabs)).spawn();
        tracing::info!(levels = interceptor.levels().len(), "extension started");

        Ok(Self {
            handle,
            tabs,
            interceptor,
            output: Rc::new(StderrOutput),
            pages: BTreeMap::new(),
        })
    }

    /// Where page consoles write their ordinary output.
    pub fn set_console_output(&mut self, output: Rc<dyn ConsoleOutput>) {
        self.output = output;
    }

    /// Open a tab and load a page into it with capture and relay in place.
    pub fn open_tab(&mut self, title: Option<&str>, fav_icon_url: Option<&str>) -> Result<TabId> {
        let tab_id = self.tabs.open(title, fav_icon_url);
        let page = Page::load_with_bridge(
            WindowId(u64::from(tab_id.0)),
            Rc::clone(&self.output),
            &self.interceptor,
            self.handle.tab_port(tab_id),
        )?;
        self.pages.insert(tab_id, page);
        tracing::debug!(tab = %tab_id, "tab opened");
        Ok(tab_id)
    }

    /// Change a tab's metadata; later logs carry the new title and icon.
    pub fn update_tab(&self, info: TabInfo) {
        self.tabs.update(info);
    }

    pub fn page(&self, tab_id: TabId) -> Option<&Page> {
        self.pages.get(&tab_id)
    }

    /// Close a tab: unload its page and purge it from the store.
    pub fn close_tab(&mut self, tab_id: TabId) -> Result<()> {
        self.pages.remove(&tab_id);
        self.tabs.close(tab_id);
        self.handle.tab_removed(tab_id)
    }

    pub fn open_tabs(&self) -> Vec<TabInfo> {
        self.tabs.list()
    }

    pub async fn connect_viewer(&self) -> Result<ViewerClient> {
        self.handle.connect_viewer().await
    }

    pub fn handle(&self) -> &AggregatorHandle {
        &self.handle
    }

    /// Unload every page and wait for the aggregator to drain its queue.
    pub async fn shutdown(mut self) -> Result<()> {
        self.pages.clear();
        self.handle.flush().await
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("tabs", &self.tabs)
            .field("pages", &self.pages.keys().collect::<Vec<_>>())
            .finish()
    }
}
