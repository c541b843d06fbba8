//! Error types for compression, classification, and file I/O.
//!
//! All fallible operations in this crate return [`Result`]. Cancellation is
//! its own variant so callers can always tell "aborted" apart from "failed";
//! it is never wrapped into an I/O or corruption error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for all operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was unusable (empty path, empty buffer,
    /// unsupported file extension, input that is already an archive).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Permission was denied at the write location.
    #[error("permission denied: {}", .0.display())]
    Permission(PathBuf),

    /// A parent directory could not be created.
    #[error("could not create directory: {}", .0.display())]
    Directory(PathBuf),

    /// A low-level I/O failure, with the original cause preserved.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A container failed to parse: truncated header, bad length field,
    /// non-UTF-8 file name, or a match stream that is not a whole number
    /// of records.
    #[error("corrupted container: {0}")]
    Corrupted(String),

    /// The operation was aborted through its [`CancelToken`](crate::CancelToken).
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for a [`Error::Corrupted`] with a formatted message.
    pub(crate) fn corrupted(message: impl Into<String>) -> Self {
        Error::Corrupted(message.into())
    }
}
