use std::fmt;

/// Result type for logtailer-capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the page and relay contexts
#[derive(Debug)]
pub enum Error {
    /// The console already has an interceptor installed
    AlreadyInstalled,

    /// The privileged side of the relay is gone
    PortClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyInstalled => write!(f, "Console interceptor is already installed"),
            Error::PortClosed => write!(f, "Runtime port is closed"),
        }
    }
}

impl std::error::Error for Error {}
