//! Request failure taxonomy and its mapping to HTTP status codes.

use hyper::StatusCode;

use crate::routing::UnsafePath;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("{0}")]
    PathUnsafe(#[from] UnsafePath),
    #[error("no regular file at {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("timed out reading {0}")]
    ReadTimeout(String),
}

impl ServeError {
    /// Status sent to the client
    ///
    /// Read failures are reported as 404 like a missing file; only the log
    /// tells them apart.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::PathUnsafe(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Unreadable { .. } | Self::ReadTimeout(_) => {
                StatusCode::NOT_FOUND
            }
        }
    }

    /// Whether the failure points at an operational problem rather than a bad URL
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::ReadTimeout(_))
    }
}
