//! Stream adapter error types.

use pkone_domain::error::PkoneError;

/// Errors specific to the byte-stream link.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Reading from or writing to the underlying stream failed.
    #[error("PKONE link I/O error")]
    Io(#[from] std::io::Error),
}

impl From<StreamError> for PkoneError {
    fn from(err: StreamError) -> Self {
        Self::Transport(Box::new(err))
    }
}
