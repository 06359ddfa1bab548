use anyhow::{Context, Result};
use logtailer_capture::{
    Console, ConsoleOutput, ObjectRef, RecordingOutput, StderrOutput, Value, WindowId,
};
use logtailer_runtime::Extension;
use logtailer_types::{TabId, TabInfo};
use serde_json::json;
use std::rc::Rc;

use super::load_state;
use crate::context::ExecutionContext;
use crate::output::print_json;

/// Window id used for the simulated third-party frame
const FOREIGN_FRAME: WindowId = WindowId(9_000);

pub async fn handle(ctx: &ExecutionContext, echo: bool) -> Result<()> {
    let mut extension = ctx.start_extension().await?;
    let output: Rc<dyn ConsoleOutput> = if echo {
        Rc::new(StderrOutput)
    } else {
        RecordingOutput::new()
    };
    extension.set_console_output(output);

    let storefront = extension.open_tab(
        Some("Storefront"),
        Some("https://shop.example/favicon.ico"),
    )?;
    let admin = extension.open_tab(Some("Admin console"), None)?;
    let promo = extension.open_tab(Some("Promo popup"), None)?;

    run_storefront(console(&extension, storefront)?);
    run_admin(console(&extension, admin)?);
    console(&extension, promo)?.log(&[Value::from("promo shown")]);

    // A frame on the storefront page tries to forge a record; the bridge drops it.
    if let Some(page) = extension.page(storefront) {
        page.window().post_from(
            FOREIGN_FRAME,
            json!({
                "type": "LOG_CAPTURED",
                "payload": { "level": "error", "message": ["forged"], "timestamp": "2026-01-01T00:00:00Z" }
            }),
        );
    }

    extension.close_tab(promo)?;

    extension.update_tab(TabInfo::new(storefront).with_title("Storefront - cart (1)"));
    console(&extension, storefront)?.info(&[Value::from("cart updated"), Value::from(1)]);

    let viewer = extension.connect_viewer().await?;
    let state = load_state(&viewer).await?;
    extension.shutdown().await?;

    let tabs = state.tabs_with_logs();
    let entries: usize = state.logs().values().map(Vec::len).sum();

    if ctx.json() {
        return print_json(&json!({
            "tabs": tabs,
            "entries": entries,
        }));
    }

    println!("Captured {} entries across {} tabs", entries, tabs.len());
    for tab in &tabs {
        let count = state.logs().get(&tab.id).map_or(0, Vec::len);
        println!("  {:>5}  {:>4} entries  {}", tab.id, count, tab.display_title());
    }
    Ok(())
}

fn console(extension: &Extension, tab_id: TabId) -> Result<&Console> {
    extension
        .page(tab_id)
        .map(|page| page.console())
        .with_context(|| format!("No page loaded in tab {}", tab_id))
}

fn run_storefront(console: &Console) {
    console.log(&[
        Value::from("page loaded"),
        Value::object([("route", Value::from("/")), ("items", Value::from(3))]),
    ]);
    console.info(&[
        Value::from("user signed in"),
        Value::object([
            ("id", Value::from(42)),
            ("roles", Value::array([Value::from("buyer")])),
        ]),
    ]);
    console.warn(&[Value::from("slow response"), Value::from(1834.5), Value::from("ms")]);

    let cart = ObjectRef::new();
    cart.set("items", Value::array([Value::from("sku-1138")]));
    cart.set("owner", Value::Object(cart.clone()));
    console.debug(&[
        Value::from("click handler"),
        Value::function("onAddToCart"),
        Value::Object(cart),
    ]);

    console.error(&[
        Value::from("checkout failed"),
        Value::error_with_stack(
            "TypeError",
            "cart.total is not a function",
            "TypeError: cart.total is not a function\n    at checkout (app.js:88:17)",
        ),
    ]);
}

fn run_admin(console: &Console) {
    console.info(&[Value::from("dashboard ready")]);
    console.log(&[Value::Undefined, Value::Null, Value::from(true)]);
    console.warn(&[Value::from("session handle"), Value::opaque("Symbol(session)")]);
}
