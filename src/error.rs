//! Error types for codec operations.
//!
//! Authentication failures are kept apart from I/O failures so a caller can
//! ask for the password again instead of reporting a generic error.

use std::io;
use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Random generator, digest or cipher primitive failed
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Reading the source or writing the destination failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Input too short or structurally invalid
    #[error("malformed encrypted file: {0}")]
    Format(String),

    /// GCM tag mismatch
    #[error("wrong password or corrupted file")]
    Authentication,
}

impl CodecError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        CodecError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` when the failure means the password should be re-entered.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CodecError::Authentication)
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::io("I/O error", err)
    }
}
