//! Sample data for tests.
//!
//! Timestamps are fixed so plain output is stable.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use logtailer_runtime::Config;
use logtailer_store::LogStore;
use logtailer_types::{LogEntry, LogLevel, TabId, TabInfo};
use serde_json::json;
use std::path::Path;

pub const CHECKOUT_TAB: TabId = TabId(7);
pub const DOCS_TAB: TabId = TabId(12);

pub fn checkout_tab() -> TabInfo {
    TabInfo::new(CHECKOUT_TAB)
        .with_title("Checkout")
        .with_fav_icon_url("https://shop.example/favicon.ico")
}

pub fn docs_tab() -> TabInfo {
    TabInfo::new(DOCS_TAB).with_title("API docs")
}

fn at(second: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, second)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Three entries (`info`, `warn`, `error`) in capture order.
pub fn checkout_entries() -> Vec<LogEntry> {
    vec![
        LogEntry::new(LogLevel::Info, vec![json!("cart loaded"), json!({ "items": 2 })])
            .with_source("checkout.js:14:5")
            .with_timestamp(at(0)),
        LogEntry::new(LogLevel::Warn, vec![json!("payment provider slow"), json!(1834)])
            .with_source("checkout.js:52:9")
            .with_timestamp(at(1)),
        LogEntry::new(
            LogLevel::Error,
            vec![
                json!("checkout failed"),
                json!({
                    "message": "card declined",
                    "stack": "Error: card declined\n    at pay (checkout.js:80:11)",
                    "name": "Error",
                    "isError": true
                }),
            ],
        )
        .with_source("checkout.js:80:11")
        .with_timestamp(at(2)),
    ]
}

pub fn docs_entries() -> Vec<LogEntry> {
    vec![
        LogEntry::new(LogLevel::Log, vec![json!("search index ready")]).with_timestamp(at(3)),
        LogEntry::new(LogLevel::Debug, vec![json!("[Function: render]")]).with_timestamp(at(4)),
    ]
}

/// Write the sample tabs into the store configured for `data_dir`.
pub fn seed_store(data_dir: &Path) -> Result<()> {
    let config = Config::load_from(&Config::path_in(data_dir))?;
    let store = LogStore::new(config.open_storage(data_dir)?);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async {
        store.initialize().await?;
        for entry in checkout_entries() {
            store.record_log(entry, checkout_tab()).await?;
        }
        for entry in docs_entries() {
            store.record_log(entry, docs_tab()).await?;
        }
        anyhow::Ok(())
    })
}
