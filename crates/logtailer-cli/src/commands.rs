use anyhow::Result;
use logtailer_runtime::resolve_data_dir;

use crate::args::{Cli, Commands};
use crate::context::ExecutionContext;
use crate::handlers;

pub fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    let ctx = ExecutionContext::new(data_dir, cli.format);

    let Some(command) = cli.command else {
        show_guidance(&ctx);
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread().build()?;

    runtime.block_on(async {
        match command {
            Commands::Init { backend } => handlers::init::handle(&ctx, backend).await,
            Commands::Tabs => handlers::tabs::handle(&ctx).await,
            Commands::Show {
                tab_id,
                levels,
                search,
            } => handlers::show::handle(&ctx, tab_id, levels, search).await,
            Commands::Clear { tab_id, all } => handlers::clear::handle(&ctx, tab_id, all).await,
            Commands::Export { output } => handlers::export::handle(&ctx, output).await,
            Commands::Query { message } => handlers::query::handle(&ctx, message).await,
            Commands::Demo { echo } => handlers::demo::handle(&ctx, echo).await,
        }
    })
}

fn show_guidance(ctx: &ExecutionContext) {
    println!("logtailer - per-tab console capture\n");
    if ctx.config_path().exists() {
        println!("Data directory: {}", ctx.data_dir().display());
        println!("\nTry:");
        println!("  logtailer demo      # capture a scripted console session");
        println!("  logtailer tabs      # list tabs with logs");
        println!("  logtailer show      # browse the first tab's logs");
    } else {
        println!("Not initialized. Run:");
        println!("  logtailer init");
    }
}
