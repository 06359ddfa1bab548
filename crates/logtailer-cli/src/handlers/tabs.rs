use anyhow::Result;
use serde_json::json;

use super::load_state;
use crate::context::ExecutionContext;
use crate::output::print_json;

pub async fn handle(ctx: &ExecutionContext) -> Result<()> {
    let extension = ctx.start_extension().await?;
    let viewer = extension.connect_viewer().await?;
    let state = load_state(&viewer).await?;

    let tabs = state.tabs_with_logs();

    if ctx.json() {
        let rows: Vec<_> = tabs
            .iter()
            .map(|tab| {
                json!({
                    "id": tab.id,
                    "title": tab.title,
                    "favIconUrl": tab.fav_icon_url,
                    "entries": state.logs().get(&tab.id).map_or(0, Vec::len),
                })
            })
            .collect();
        return print_json(&rows);
    }

    if tabs.is_empty() {
        println!("No tabs with logs.");
        return Ok(());
    }

    for tab in &tabs {
        let count = state.logs().get(&tab.id).map_or(0, Vec::len);
        let marker = if state.active_tab() == Some(tab.id) { "*" } else { " " };
        println!("{} {:>5}  {:>4} entries  {}", marker, tab.id, count, tab.display_title());
    }
    Ok(())
}
