pub mod entry;
pub mod error;
pub mod level;
pub mod message;

pub use entry::{LogEntry, LogSnapshot, TabId, TabInfo, TabInfos, TabLogs};
pub use error::{Error, Result};
pub use level::LogLevel;
pub use message::{
    decode_aggregator_message, decode_viewer_message, Ack, NewLog, Notification, PageMessage,
    Participant, TabRef, ViewerRequest, ViewerResponse,
};
