//! Error types for MIME assembly.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header field failed validation.
    #[error(transparent)]
    Header(#[from] mailfold_header::Error),

    /// Reading attachment data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid multipart structure.
    #[error("Invalid multipart structure: {0}")]
    InvalidMultipart(String),
}
