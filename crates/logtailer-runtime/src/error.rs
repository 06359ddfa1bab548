use std::fmt;

/// Result type for logtailer-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Storage layer error
    Store(logtailer_store::Error),

    /// Page-side error (interceptor install, closed port)
    Capture(logtailer_capture::Error),

    /// Cross-context message could not be decoded
    Protocol(logtailer_types::Error),

    /// JSON encoding or decoding failed
    Json(serde_json::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// The aggregator task is no longer running
    AggregatorStopped,

    /// The aggregator answered a request with `success: false`
    Rejected(String),

    /// The aggregator answered with a response of the wrong shape
    UnexpectedResponse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Capture(err) => write!(f, "Capture error: {}", err),
            Error::Protocol(err) => write!(f, "Protocol error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::AggregatorStopped => write!(f, "Aggregator is not running"),
            Error::Rejected(msg) => write!(f, "Request rejected: {}", msg),
            Error::UnexpectedResponse(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Capture(err) => Some(err),
            Error::Protocol(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_)
            | Error::AggregatorStopped
            | Error::Rejected(_)
            | Error::UnexpectedResponse(_) => None,
        }
    }
}

impl From<logtailer_store::Error> for Error {
    fn from(err: logtailer_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<logtailer_capture::Error> for Error {
    fn from(err: logtailer_capture::Error) -> Self {
        Error::Capture(err)
    }
}

impl From<logtailer_types::Error> for Error {
    fn from(err: logtailer_types::Error) -> Self {
        Error::Protocol(err)
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

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
