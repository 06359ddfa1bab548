//! Custom assertions over the CLI's JSON output.

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert that a `tabs --format json` listing has `expected` rows.
pub fn assert_tab_count(json: &Value, expected: usize) -> Result<()> {
    let tabs = json.as_array().context("Expected a JSON array of tabs")?;
    if tabs.len() != expected {
        anyhow::bail!("Expected {} tabs, got {}", expected, tabs.len());
    }
    Ok(())
}

/// Assert the levels of a `show --format json` listing, in order.
pub fn assert_levels(json: &Value, expected: &[&str]) -> Result<()> {
    let entries = json.as_array().context("Expected a JSON array of entries")?;
    let levels: Vec<&str> = entries
        .iter()
        .map(|entry| entry["level"].as_str().unwrap_or("<missing>"))
        .collect();
    if levels != expected {
        anyhow::bail!("Expected levels {:?}, got {:?}", expected, levels);
    }
    Ok(())
}

/// Assert that a log mapping (export output, `logs` of a snapshot) has no
/// entry for `tab_id`.
pub fn assert_tab_absent(logs: &Value, tab_id: u32) -> Result<()> {
    let logs = logs.as_object().context("Expected a JSON object keyed by tab id")?;
    if logs.contains_key(&tab_id.to_string()) {
        anyhow::bail!("Tab {} still present: {:?}", tab_id, logs.keys().collect::<Vec<_>>());
    }
    Ok(())
}
