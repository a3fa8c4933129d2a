//! Errors for finding and applying a vanity nonce

use std::path::PathBuf;

use thiserror::Error;
use vanity_core::{NotFoundReason, SearchError};

#[derive(Error, Debug)]
pub enum VanityError {
    /// Rejected inputs: prefix, nonce length, alphabet or partition plan
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(
        "No {nonce_len}-character nonce over {alphabet:?} gives prefix {prefix}; retry with a longer nonce"
    )]
    SearchExhausted {
        prefix: String,
        nonce_len: usize,
        alphabet: String,
    },

    #[error("Search stopped without a nonce: {0}")]
    Interrupted(NotFoundReason),

    /// The rewritten commit does not hash to what the search predicted
    #[error(
        "Commit is now {actual} but the search predicted {expected}; repository left as-is for inspection"
    )]
    IntegrityMismatch { expected: String, actual: String },

    #[error("Raw commit content does not end with its message")]
    MessageMismatch,

    /// Git drops the header/message separator for an empty message, so the
    /// amended commit could not match the searched bytes
    #[error("Commit has an empty message; give it a message before adding a nonce")]
    EmptyMessage,

    /// Amending discards the signature, which changes the hashed bytes
    #[error("Commit carries a {0} signature header; signed commits cannot be rewritten")]
    SignedCommit(String),

    #[error("`{command}` failed: {reason}")]
    Collaborator { command: String, reason: String },

    #[error("Invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
