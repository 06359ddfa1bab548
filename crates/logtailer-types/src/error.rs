use std::fmt;

/// Result type for logtailer-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding cross-context messages
#[derive(Debug)]
pub enum Error {
    /// JSON payload did not match the expected shape
    Decode(serde_json::Error),

    /// Message did not come from the expected participant
    UnexpectedSender(String),

    /// Request carried a `type` tag nobody handles
    UnknownRequest(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "Decode error: {}", err),
            Error::UnexpectedSender(from) => write!(f, "Unexpected sender: {}", from),
            Error::UnknownRequest(_) => write!(f, "Unknown request type"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::UnexpectedSender(_) | Error::UnknownRequest(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}
