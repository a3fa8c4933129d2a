//! Incremental nonce search
//!
//! The search tree has one level per nonce character. Instead of recursing,
//! the engine keeps an explicit stack of hash states where `states[i]` is the
//! state after `i` chosen characters. Advancing to the next candidate works
//! like an odometer: the rightmost position that can still be incremented is
//! bumped, everything to its right resets to the first character, and only
//! the states from that position down are recomputed.
//!
//! For a 36-character alphabet this means 35 of every 36 candidates cost a
//! single one-byte update plus the terminating newline.

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use sha1::{Digest, Sha1};

use crate::alphabet::Alphabet;
use crate::error::SearchError;
use crate::params::{DIGEST_SIZE, NONCE_TERMINATOR};
use crate::payload::Seed;
use crate::prefix::DesiredPrefix;

/// A nonce whose commit id starts with the desired prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Full 40-character lowercase commit id
    pub digest_hex: String,
    /// Characters to append as the last message line
    pub nonce: String,
}

/// Why a search ended without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Every candidate in the assigned space was tried
    Exhausted,
    /// Stopped by its stop signal before the space was exhausted
    Cancelled,
    /// The stop signal's deadline passed
    DeadlineExpired,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("search space exhausted"),
            Self::Cancelled => f.write_str("search cancelled"),
            Self::DeadlineExpired => f.write_str("deadline expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Found(Solution),
    NotFound(NotFoundReason),
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Found(solution) => Some(solution),
            Self::NotFound(_) => None,
        }
    }
}

/// Cooperative cancellation shared between workers.
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: AtomicBool,
    deadline: Option<Instant>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that also counts as raised once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            raised: AtomicBool::new(false),
            deadline: Some(deadline),
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed) || self.deadline_passed()
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// The reason to report for a search this signal interrupted.
    pub fn reason(&self) -> NotFoundReason {
        if self.deadline_passed() {
            NotFoundReason::DeadlineExpired
        } else {
            NotFoundReason::Cancelled
        }
    }
}

/// Depth-first searcher for one subtree of the nonce space.
pub struct Engine<'a> {
    alphabet: &'a [u8],
    prefix: &'a DesiredPrefix,
    stop: Option<&'a StopSignal>,
    candidates: u64,
}

impl<'a> Engine<'a> {
    pub fn new(alphabet: &'a Alphabet, prefix: &'a DesiredPrefix) -> Self {
        Self {
            alphabet: alphabet.as_bytes(),
            prefix,
            stop: None,
            candidates: 0,
        }
    }

    /// Check `stop` between subtrees so the search can be abandoned early.
    pub fn with_stop(mut self, stop: &'a StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Candidates finalized so far, across every call on this engine.
    pub fn candidates(&self) -> u64 {
        self.candidates
    }

    /// Search every remaining nonce character of `seed`.
    pub fn run(&mut self, seed: Seed) -> Result<SearchResult, SearchError> {
        let depth = seed.remaining();
        self.search(seed, depth)
    }

    /// Search `alphabet^depth` suffixes below `seed` in alphabet order.
    ///
    /// Fails with [`SearchError::LengthMismatch`] if `depth` characters plus
    /// the terminator would not produce the object length `seed` was hashed with.
    pub fn search(&mut self, seed: Seed, depth: usize) -> Result<SearchResult, SearchError> {
        let Seed { state, fixed, owed } = seed;
        if owed != depth + 1 {
            return Err(SearchError::LengthMismatch {
                declared: owed,
                fed: depth + 1,
            });
        }

        if self.stopped() {
            return Ok(SearchResult::NotFound(self.stop_reason()));
        }

        let alphabet = self.alphabet;
        let radix = alphabet.len();
        let mut indices = vec![0usize; depth];

        // states[i] has absorbed the first i characters of the current candidate
        let mut states: Vec<Sha1> = Vec::with_capacity(depth + 1);
        states.push(state);
        for level in 0..depth {
            let mut next = states[level].clone();
            next.update([alphabet[0]]);
            states.push(next);
        }

        loop {
            self.candidates += 1;
            let mut leaf = states[depth].clone();
            leaf.update([NONCE_TERMINATOR]);
            let digest: [u8; DIGEST_SIZE] = leaf.finalize().into();

            if self.prefix.matches(&digest) {
                let mut nonce = fixed;
                nonce.extend(indices.iter().map(|&i| alphabet[i]));
                return Ok(SearchResult::Found(Solution {
                    digest_hex: hex::encode(digest),
                    nonce: String::from_utf8_lossy(&nonce).into_owned(),
                }));
            }

            // Odometer step: find the rightmost position that can advance
            let mut level = depth;
            loop {
                if level == 0 {
                    return Ok(SearchResult::NotFound(NotFoundReason::Exhausted));
                }
                level -= 1;
                indices[level] += 1;
                if indices[level] < radix {
                    break;
                }
                indices[level] = 0;
            }

            // Entering a new subtree above the leaf level
            if level + 1 < depth && self.stopped() {
                return Ok(SearchResult::NotFound(self.stop_reason()));
            }

            for l in level..depth {
                let mut next = states[l].clone();
                next.update([alphabet[indices[l]]]);
                states[l + 1] = next;
            }
        }
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.stop.is_some_and(StopSignal::is_raised)
    }

    fn stop_reason(&self) -> NotFoundReason {
        self.stop
            .map_or(NotFoundReason::Cancelled, StopSignal::reason)
    }
}

/// Search `alphabet^depth` suffixes below `seed` without cancellation.
pub fn search_from(
    seed: Seed,
    depth: usize,
    alphabet: &Alphabet,
    prefix: &DesiredPrefix,
) -> Result<SearchResult, SearchError> {
    Engine::new(alphabet, prefix).search(seed, depth)
}
