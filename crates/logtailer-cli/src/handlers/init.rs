use anyhow::{Context, Result};
use logtailer_runtime::{Config, StorageBackend};
use logtailer_store::LogStore;
use serde_json::json;

use crate::context::ExecutionContext;
use crate::output::print_json;
use crate::types::BackendArg;

pub async fn handle(ctx: &ExecutionContext, backend: Option<BackendArg>) -> Result<()> {
    let data_dir = ctx.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let config_path = ctx.config_path();
    let created = !config_path.exists();
    let mut config = if created { Config::default() } else { ctx.config()? };
    if let Some(backend) = backend {
        config.storage.backend = backend.into();
    }
    if created || backend.is_some() {
        config.save_to(&config_path)?;
    }

    let store = LogStore::new(config.open_storage(data_dir)?);
    store.initialize().await?;
    let tabs = store.tab_count().await?;
    let entries = store.entry_count().await?;

    let database = match config.storage.backend {
        StorageBackend::Sqlite => Some(config.storage_path(data_dir)),
        StorageBackend::Memory => None,
    };

    if ctx.json() {
        return print_json(&json!({
            "dataDir": data_dir.display().to_string(),
            "config": config_path.display().to_string(),
            "configCreated": created,
            "backend": store.storage().backend_name(),
            "database": database.as_ref().map(|path| path.display().to_string()),
            "tabs": tabs,
            "entries": entries,
        }));
    }

    println!("Data directory: {}", data_dir.display());
    let verb = if created { "created" } else { "loaded" };
    println!("Config:         {} ({})", config_path.display(), verb);
    match &database {
        Some(path) => println!("Log store:      {} (sqlite)", path.display()),
        None => println!("Log store:      in-memory (nothing persists between runs)"),
    }
    println!("Stored:         {} entries across {} tabs", entries, tabs);
    Ok(())
}
