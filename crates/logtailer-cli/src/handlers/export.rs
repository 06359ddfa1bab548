use anyhow::{Context, Result};
use chrono::Utc;
use logtailer_runtime::default_export_filename;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::load_state;
use crate::context::ExecutionContext;
use crate::output::print_json;

pub async fn handle(ctx: &ExecutionContext, output: Option<PathBuf>) -> Result<()> {
    let extension = ctx.start_extension().await?;
    let viewer = extension.connect_viewer().await?;
    let state = load_state(&viewer).await?;
    let exported = state.export_json()?;

    if output.as_deref() == Some(Path::new("-")) {
        println!("{}", exported);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(default_export_filename(Utc::now())));
    std::fs::write(&path, &exported)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let entries: usize = state.logs().values().map(Vec::len).sum();
    if ctx.json() {
        return print_json(&json!({
            "path": path.display().to_string(),
            "tabs": state.logs().len(),
            "entries": entries,
        }));
    }
    println!(
        "Exported {} entries from {} tabs to {}",
        entries,
        state.logs().len(),
        path.display()
    );
    Ok(())
}
