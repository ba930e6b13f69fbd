//! Error types
//!
//! Defines domain-specific error types for each layer of the driver.

use std::fmt;

/// Errors reported by a remote page store implementation
#[derive(Debug)]
pub enum RemoteError {
    /// The network round trip itself failed
    Transport(String),
    /// The remote answered but the response could not be interpreted
    Protocol(String),
    /// The requested page does not exist remotely
    PageNotFound(String),
    /// A bounded remote call did not complete in time
    Timeout(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "remote transport failure: {}", msg),
            RemoteError::Protocol(msg) => write!(f, "remote protocol failure: {}", msg),
            RemoteError::PageNotFound(id) => write!(f, "page not found: {}", id),
            RemoteError::Timeout(op) => write!(f, "remote call timed out: {}", op),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Filesystem operation errors
///
/// Every engine operation returns this type; `error::handlers::errno_for`
/// maps each variant onto the negative POSIX code the callback host
/// expects.
#[derive(Debug)]
pub enum FsError {
    NotFound(String),
    NotImplemented(String),
    IsDirectory(String),
    NotSupported(String),
    AlreadyExists(String),
    NotEmpty(String),
    Io(String),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::NotFound(p) => write!(f, "no such entry: {}", p),
            FsError::NotImplemented(p) => write!(f, "no handler for: {}", p),
            FsError::IsDirectory(p) => write!(f, "is a directory: {}", p),
            FsError::NotSupported(op) => write!(f, "operation not supported: {}", op),
            FsError::AlreadyExists(p) => write!(f, "entry already exists: {}", p),
            FsError::NotEmpty(p) => write!(f, "directory not empty: {}", p),
            FsError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FsError {}

// Remote failures never escape an operation as anything but an I/O error.
impl From<RemoteError> for FsError {
    fn from(error: RemoteError) -> Self {
        FsError::Io(error.to_string())
    }
}
