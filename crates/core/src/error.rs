//! Errors raised before or during a nonce search

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("Invalid nonce length {0}: must be between 1 and {max}", max = crate::params::MAX_NONCE_LEN)]
    InvalidNonceLength(usize),

    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("Invalid partition plan: {0}")]
    InvalidPartition(String),

    /// The object length hashed into the header disagrees with the bytes the
    /// engine is about to feed.
    #[error("Declared object length expects {declared} more bytes, search would feed {fed}")]
    LengthMismatch { declared: usize, fed: usize },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}
