use std::fmt;

/// Result type for logtailer-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the storage layer
#[derive(Debug)]
pub enum Error {
    /// Database operation failed
    Database(rusqlite::Error),

    /// A stored value could not be encoded or decoded
    Json(serde_json::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Backend-specific failure (lock poisoned, unexpected shape, ...)
    Storage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => {
                let msg = err.to_string();
                if msg.contains("no such table") {
                    write!(f, "Storage schema mismatch: {}. Run `logtailer init` to recreate it.", msg)
                } else {
                    write!(f, "Database error: {}", err)
                }
            }
            Error::Json(err) => write!(f, "Stored value is not valid: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Storage(_) => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
