pub mod clear;
pub mod demo;
pub mod export;
pub mod init;
pub mod query;
pub mod show;
pub mod tabs;

use anyhow::Result;
use logtailer_runtime::{ViewerClient, ViewerState};

/// The popup's first step: fetch everything and build local state.
async fn load_state(viewer: &ViewerClient) -> Result<ViewerState> {
    Ok(ViewerState::from_snapshot(viewer.get_initial_data().await?))
}
