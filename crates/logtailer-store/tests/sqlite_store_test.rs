use chrono::{TimeZone, Utc};
use logtailer_store::{LogStore, SqliteStorage};
use logtailer_types::{LogEntry, LogLevel, TabId, TabInfo};
use serde_json::json;
use tempfile::TempDir;

fn sample_entry() -> LogEntry {
    LogEntry::new(
        LogLevel::Error,
        vec![
            json!("request failed"),
            json!({ "status": 502, "retry": false }),
            json!({ "message": "bad gateway", "stack": null, "name": "Error", "isError": true }),
        ],
    )
    .with_source("app.js:10:3")
    .with_timestamp(Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap())
}

#[tokio::test]
async fn test_recorded_entry_round_trips_through_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logtailer.db");
    let tab = TabInfo::new(TabId(11))
        .with_title("Checkout")
        .with_fav_icon_url("https://shop.test/favicon.ico");

    {
        let store = LogStore::new(SqliteStorage::open(&path).unwrap());
        store.initialize().await.unwrap();
        store.record_log(sample_entry(), tab.clone()).await.unwrap();
    }

    let store = LogStore::new(SqliteStorage::open(&path).unwrap());
    let snapshot = store.get_all().await.unwrap();

    assert_eq!(snapshot.logs[&TabId(11)], vec![sample_entry()]);
    assert_eq!(snapshot.tabs[&TabId(11)], tab);
}

#[tokio::test]
async fn test_interleaved_tabs_keep_their_own_order() {
    let store = LogStore::new(SqliteStorage::open_in_memory().unwrap());
    store.initialize().await.unwrap();

    for n in 0..6u32 {
        let tab_id = TabId(n % 2);
        let entry = LogEntry::new(LogLevel::Log, vec![json!(n)]);
        store.record_log(entry, TabInfo::new(tab_id)).await.unwrap();
    }

    let snapshot = store.get_all().await.unwrap();
    let even: Vec<_> = snapshot.logs[&TabId(0)].iter().map(|e| e.message[0].clone()).collect();
    let odd: Vec<_> = snapshot.logs[&TabId(1)].iter().map(|e| e.message[0].clone()).collect();
    assert_eq!(even, vec![json!(0), json!(2), json!(4)]);
    assert_eq!(odd, vec![json!(1), json!(3), json!(5)]);
}

#[tokio::test]
async fn test_concurrent_records_are_not_lost() {
    let store = std::sync::Arc::new(LogStore::new(SqliteStorage::open_in_memory().unwrap()));
    store.initialize().await.unwrap();

    let mut tasks = Vec::new();
    for n in 0..20u32 {
        let store = std::sync::Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let entry = LogEntry::new(LogLevel::Info, vec![json!(n)]);
            store.record_log(entry, TabInfo::new(TabId(n % 3))).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.entry_count().await.unwrap(), 20);
    assert_eq!(store.tab_count().await.unwrap(), 3);
}
