//! # Vanity Commit Core
//!
//! Brute-force search for a short nonce that, appended to a git commit
//! message, makes the commit's SHA-1 object id start with a chosen hex prefix.
//!
//! ## Object Format
//!
//! Git hashes a commit as its loose-object encoding:
//!
//! ```text
//! commit <len>\0<headers and message>\n<nonce>\n
//!                 ^^^^^^^^^^^^^^^^^^^^^^ ^^^^^^^
//!                 fixed body             searched
//! ```
//!
//! `<len>` covers everything after the NUL, so it is fixed before hashing
//! starts and must account for the nonce that has not been found yet.
//!
//! ## Search
//!
//! - **Incremental**: the SHA-1 state after the fixed body is computed once
//!   and cloned per nonce character, so each candidate costs one character
//!   and one newline of hashing instead of the whole object.
//! - **Ordered**: candidates are enumerated depth-first in alphabet order;
//!   the first match is the lexicographically smallest one.
//! - **Partitioned**: with the `parallel` feature, the nonce space is split by
//!   fixed prefixes and raced across a worker pool with early cancellation.
//!
//! ## Example
//!
//! ```rust
//! use vanity_core::{Alphabet, CommitPayload, DesiredPrefix, SearchParams, SearchResult, search};
//!
//! let payload = CommitPayload::new(b"tree abc\nparent def\n\nmessage\n");
//! let params = SearchParams::new(
//!     "0".parse::<DesiredPrefix>().unwrap(),
//!     Alphabet::base36(),
//!     None,
//! )
//! .unwrap();
//!
//! let report = search(&payload, &params).unwrap();
//! if let SearchResult::Found(solution) = report.result {
//!     assert!(solution.digest_hex.starts_with('0'));
//! }
//! ```

mod alphabet;
mod engine;
mod error;
mod params;
mod partition;
mod payload;
mod prefix;

#[cfg(feature = "parallel")]
mod parallel;

pub use alphabet::Alphabet;
pub use engine::{Engine, NotFoundReason, SearchResult, Solution, StopSignal, search_from};
pub use error::SearchError;
pub use params::*;
pub use partition::{Partition, full_partition_count, plan};
pub use payload::{CommitPayload, Seed};
pub use prefix::DesiredPrefix;

#[cfg(feature = "parallel")]
pub use parallel::ParallelSearch;

use std::time::{Duration, Instant};

/// Validated inputs shared by every search mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    prefix: DesiredPrefix,
    alphabet: Alphabet,
    nonce_len: usize,
}

impl SearchParams {
    /// Validate and bundle search inputs.
    ///
    /// `nonce_len` defaults to the prefix length plus [`DEFAULT_EXTRA_NONCE_CHARS`]
    /// and may not exceed [`MAX_NONCE_LEN`].
    pub fn new(
        prefix: DesiredPrefix,
        alphabet: Alphabet,
        nonce_len: Option<usize>,
    ) -> Result<Self, SearchError> {
        let nonce_len = nonce_len.unwrap_or(prefix.len() + DEFAULT_EXTRA_NONCE_CHARS);
        if nonce_len == 0 || nonce_len > MAX_NONCE_LEN {
            return Err(SearchError::InvalidNonceLength(nonce_len));
        }
        Ok(Self {
            prefix,
            alphabet,
            nonce_len,
        })
    }

    pub fn prefix(&self) -> &DesiredPrefix {
        &self.prefix
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Total number of characters appended to the message, partition prefix included.
    pub fn nonce_len(&self) -> usize {
        self.nonce_len
    }
}

/// Outcome of a search together with throughput numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub result: SearchResult,
    /// Number of candidate nonces whose digest was finalized
    pub candidates: u64,
    pub elapsed: Duration,
}

impl SearchReport {
    /// Candidates per second over the whole search.
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.candidates as f64 / secs
        } else {
            0.0
        }
    }
}

/// Single-worker exhaustive search over the full nonce space.
///
/// Returns the lexicographically smallest matching nonce, or
/// [`NotFoundReason::Exhausted`] when no nonce of the configured length matches.
pub fn search(payload: &CommitPayload, params: &SearchParams) -> Result<SearchReport, SearchError> {
    let start = Instant::now();
    let seed = payload.seed(&[], params.nonce_len())?;
    let mut engine = Engine::new(params.alphabet(), params.prefix());
    let result = engine.run(seed)?;

    Ok(SearchReport {
        result,
        candidates: engine.candidates(),
        elapsed: start.elapsed(),
    })
}
