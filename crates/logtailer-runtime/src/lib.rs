//! Privileged half of logtailer.
//!
//! The [`Aggregator`] owns the log store and handles one message at a time:
//! log records relayed from pages, viewer queries, and tab-closed events.
//! [`Extension`] wires pages, bridges, the tab directory and viewers to it.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod extension;
pub mod notifier;
pub mod tabs;
pub mod viewer;
pub mod viewer_state;

pub use aggregator::{Aggregator, AggregatorHandle, TabPort};
pub use config::{CaptureConfig, Config, StorageBackend, StorageConfig, resolve_data_dir};
pub use error::{Error, Result};
pub use extension::Extension;
pub use notifier::{LiveLogs, Notifier};
pub use tabs::{BrowserTabs, TabDirectory};
pub use viewer::ViewerClient;
pub use viewer_state::{LogFilter, ViewerState, default_export_filename, format_message};
