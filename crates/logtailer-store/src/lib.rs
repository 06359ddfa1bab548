pub mod error;
pub mod log_store;
pub mod schema;
pub mod storage;

pub use error::{Error, Result};
pub use log_store::{KEY_LOGS, KEY_TABS, LogStore};
pub use storage::{AnyStorage, MemoryStorage, SqliteStorage, Storage};
