use anyhow::{Result, bail};
use logtailer_types::{Ack, TabId};

use crate::context::ExecutionContext;
use crate::output::print_json;

pub async fn handle(ctx: &ExecutionContext, tab_id: Option<u32>, all: bool) -> Result<()> {
    let extension = ctx.start_extension().await?;
    let viewer = extension.connect_viewer().await?;

    let ack = match (all, tab_id) {
        (true, _) => viewer.clear_all().await?,
        (false, Some(id)) => viewer.clear_tab(TabId(id)).await?,
        (false, None) => bail!("Specify a tab id or --all"),
    };

    extension.shutdown().await?;
    report(ctx, &ack)
}

fn report(ctx: &ExecutionContext, ack: &Ack) -> Result<()> {
    if ctx.json() {
        print_json(ack)?;
    } else if ack.success {
        match ack.tab_id {
            Some(tab_id) => println!("Cleared logs for tab {}", tab_id),
            None => println!("Cleared all logs"),
        }
    }

    if !ack.success {
        bail!(
            "{}",
            ack.error.as_deref().unwrap_or("Aggregator rejected the request")
        );
    }
    Ok(())
}
