use std::collections::TryReserveError;
use std::fmt::{self, Display, Formatter};

#[derive(Debug)]
pub enum StreamError {
    /// The growth engine could not obtain memory for the buffer.
    /// The buffer and its length are left unchanged.
    Allocation(TryReserveError),
    /// Error returned when creating a scratch file or directory.
    Create(std::io::Error),
    /// Error returned by call to `flush()` from `std::io::Write` trait.
    Flush(std::io::Error),
    /// Error returned by call to `seek()` from `std::io::Seek` trait.
    Seek(std::io::Error),
    /// Error returned by call to `read()` from `std::io::Read` trait.
    Read(std::io::Error),
    /// Error returned when deleting a scratch file or directory.
    Remove(std::io::Error),
    /// The stream being closed was never registered, or was closed already.
    UnknownHandle,
    /// A seek operation computed an offset below the stream start.
    InvalidSeek,
}

/// Result type of [`memstream`](index.html) operations.
/// See [`StreamError`](enum.StreamError.html).
pub type StreamResult<T> = Result<T, StreamError>;

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Allocation(e) => {
                write!(f, "buffer growth failed: {}", e)
            }
            StreamError::Create(e) => {
                write!(f, "scratch file creation failed: {}", e)
            }
            StreamError::Flush(e) => write!(f, "stream flush failed: {}", e),
            StreamError::Seek(e) => write!(f, "stream seek failed: {}", e),
            StreamError::Read(e) => write!(f, "stream read failed: {}", e),
            StreamError::Remove(e) => {
                write!(f, "scratch file deletion failed: {}", e)
            }
            StreamError::UnknownHandle => {
                write!(f, "stream handle is not registered")
            }
            StreamError::InvalidSeek => {
                write!(f, "seek before the start of the stream")
            }
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Allocation(e) => Some(e),
            StreamError::Create(e)
            | StreamError::Flush(e)
            | StreamError::Seek(e)
            | StreamError::Read(e)
            | StreamError::Remove(e) => Some(e),
            StreamError::UnknownHandle | StreamError::InvalidSeek => None,
        }
    }
}

impl From<StreamError> for std::io::Error {
    /// Convert a [`StreamError`](enum.StreamError.html) into the
    /// [`std::io::Error`] returned by `std::io` trait methods.
    fn from(e: StreamError) -> Self {
        let kind = match &e {
            StreamError::Allocation(_) => std::io::ErrorKind::OutOfMemory,
            StreamError::UnknownHandle => std::io::ErrorKind::NotFound,
            StreamError::InvalidSeek => std::io::ErrorKind::InvalidInput,
            StreamError::Create(e)
            | StreamError::Flush(e)
            | StreamError::Seek(e)
            | StreamError::Read(e)
            | StreamError::Remove(e) => e.kind(),
        };
        std::io::Error::new(kind, e)
    }
}
