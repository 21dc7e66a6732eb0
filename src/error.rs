//! Error type for the I/O shell around the inspector.
//!
//! The classification pipeline itself never fails. Errors only come from
//! reading objects, writing reports, serving requests and decoding blob ids.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blob id that is not base64url or does not decode to 32 bytes
    #[error("Invalid blob id: {0}")]
    InvalidBlobId(String),

    /// Requested path resolves outside the served root
    #[error("Path is outside the served directory: {0}")]
    PathOutsideRoot(String),

    /// Request body larger than the configured limit, in bytes
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
