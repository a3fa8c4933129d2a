//! Vanity Commit Library
//!
//! Rewrites a git commit so that its id starts with a chosen hex prefix, by
//! appending a short nonce line to the commit message.
//!
//! # Overview
//!
//! - [`engine`] searches for the nonce (re-export of `vanity-core`)
//! - [`git`] reads commits and amends them through the `git` binary
//! - [`rewrite`] ties the two together and verifies the result
//!
//! # Example
//!
//! ```rust,no_run
//! use vanity::config::MinerConfig;
//! use vanity::git::GitCli;
//! use vanity::rewrite;
//!
//! let store = GitCli::new(".");
//! let outcome = rewrite::run(&store, "HEAD", "c0ffee".parse()?, &MinerConfig::default(), 8)?;
//! println!("{} -> {}", outcome.nonce, outcome.digest);
//! # Ok::<(), vanity::VanityError>(())
//! ```

// Re-export the search engine
pub use vanity_core as engine;

pub mod config;
pub mod error;
pub mod git;
pub mod rewrite;

// Convenience re-exports
pub use engine::{Alphabet, CommitPayload, DesiredPrefix, SearchResult};
pub use error::VanityError;
