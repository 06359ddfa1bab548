use anyhow::{Result, bail};
use logtailer_types::{LogLevel, TabId};

use super::load_state;
use crate::context::ExecutionContext;
use crate::output::{entry_line, print_json, use_color};

pub async fn handle(
    ctx: &ExecutionContext,
    tab_id: Option<u32>,
    levels: Vec<LogLevel>,
    search: Option<String>,
) -> Result<()> {
    let extension = ctx.start_extension().await?;
    let viewer = extension.connect_viewer().await?;
    let mut state = load_state(&viewer).await?;

    match tab_id {
        Some(id) => {
            let id = TabId(id);
            if !state.logs().contains_key(&id) {
                bail!("No logs recorded for tab {}", id);
            }
            state.select(id);
        }
        None => {
            if state.ensure_active_tab().is_none() {
                if ctx.json() {
                    return print_json(&[] as &[()]);
                }
                println!("No tabs with logs.");
                return Ok(());
            }
        }
    }

    if !levels.is_empty() {
        let filter = std::mem::take(state.filter_mut()).with_levels(levels);
        *state.filter_mut() = filter;
    }
    if let Some(search) = &search {
        state.filter_mut().set_search(search);
    }

    let entries = state.visible_entries();

    if ctx.json() {
        return print_json(&entries);
    }

    if let Some(tab) = state.active_tab() {
        let title = state
            .tab(tab)
            .map(|info| info.display_title())
            .unwrap_or_else(|| format!("Tab ID: {}", tab));
        println!("== {} (tab {}) ==", title, tab);
    }

    if entries.is_empty() {
        println!("No logs match the current filters.");
        return Ok(());
    }

    let color = use_color();
    for entry in entries {
        println!("{}", entry_line(entry, color));
    }
    Ok(())
}
