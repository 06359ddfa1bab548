use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

use crate::context::ExecutionContext;
use crate::output::print_json;

pub async fn handle(ctx: &ExecutionContext, message: Option<String>) -> Result<()> {
    let raw = match message {
        Some(message) => message,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read message from stdin")?;
            buf
        }
    };
    let message: Value = serde_json::from_str(&raw).context("Message is not valid JSON")?;

    let extension = ctx.start_extension().await?;
    let response = extension.handle().request_raw(message).await?;
    extension.shutdown().await?;

    match response {
        Some(response) => print_json(&response),
        None if ctx.json() => print_json(&Value::Null),
        None => {
            println!("(no response: message was not addressed by a viewer)");
            Ok(())
        }
    }
}
