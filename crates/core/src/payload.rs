//! Git commit object encoding
//!
//! A commit id is `SHA1("commit " || len || "\0" || body)`, where `body` is
//! the `git cat-file commit` output. The nonce search appends
//! `partition_prefix || suffix || "\n"` to a body that already ends in one
//! newline, so `len` has to be known before the first byte is hashed.

use sha1::{Digest, Sha1};

use crate::error::SearchError;
use crate::params::{MAX_NONCE_LEN, NONCE_TERMINATOR, OBJECT_KIND};

/// Commit body with its trailing newlines normalized to exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPayload {
    body: Vec<u8>,
}

impl CommitPayload {
    /// Wrap raw `git cat-file commit` output.
    pub fn new(raw: &[u8]) -> Self {
        let end = raw
            .iter()
            .rposition(|&b| b != b'\n')
            .map_or(0, |last| last + 1);

        let mut body = Vec::with_capacity(end + 1);
        body.extend_from_slice(&raw[..end]);
        body.push(b'\n');
        Self { body }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Whether the body ends with `message`, ignoring trailing newlines on both.
    pub fn ends_with_message(&self, message: &str) -> bool {
        let message = message.trim_end_matches('\n').as_bytes();
        self.body[..self.body.len() - 1].ends_with(message)
    }

    /// Length declared in the object header once `appended` nonce characters
    /// and the terminating newline follow the body.
    ///
    /// `None` if that length does not fit in a `usize`.
    pub fn object_len(&self, appended: usize) -> Option<usize> {
        self.body.len().checked_add(appended)?.checked_add(1)
    }

    /// Loose-object header for an object of `object_len` bytes.
    pub fn header(object_len: usize) -> Vec<u8> {
        let mut header = Vec::with_capacity(OBJECT_KIND.len() + 24);
        header.extend_from_slice(OBJECT_KIND);
        header.push(b' ');
        header.extend_from_slice(object_len.to_string().as_bytes());
        header.push(0);
        header
    }

    /// Hash state after `header || body || fixed`, for a nonce that continues
    /// with `remaining` more characters.
    ///
    /// Fails with [`SearchError::InvalidNonceLength`] if the whole nonce would
    /// be longer than [`MAX_NONCE_LEN`].
    pub fn seed(&self, fixed: &[u8], remaining: usize) -> Result<Seed, SearchError> {
        let nonce_len = fixed.len().saturating_add(remaining);
        if nonce_len > MAX_NONCE_LEN {
            return Err(SearchError::InvalidNonceLength(nonce_len));
        }
        let object_len = self
            .object_len(nonce_len)
            .ok_or(SearchError::InvalidNonceLength(nonce_len))?;

        let mut state = Sha1::new();
        state.update(Self::header(object_len));
        state.update(&self.body);
        state.update(fixed);

        Ok(Seed {
            state,
            fixed: fixed.to_vec(),
            owed: remaining + 1,
        })
    }

    /// Complete object bytes for `nonce`, header included.
    pub fn encode(&self, nonce: &[u8]) -> Vec<u8> {
        // Both lengths belong to live allocations, so the sum cannot overflow
        let header = Self::header(self.body.len() + nonce.len() + 1);
        let mut object = Vec::with_capacity(header.len() + self.body.len() + nonce.len() + 1);
        object.extend_from_slice(&header);
        object.extend_from_slice(&self.body);
        object.extend_from_slice(nonce);
        object.push(NONCE_TERMINATOR);
        object
    }

    /// Commit id for `nonce`, hashed in one pass.
    pub fn object_id(&self, nonce: &[u8]) -> String {
        hex::encode(Sha1::digest(self.encode(nonce)))
    }
}

/// Root of a search subtree: a hash state plus the bytes it still expects.
#[derive(Clone)]
pub struct Seed {
    pub(crate) state: Sha1,
    pub(crate) fixed: Vec<u8>,
    /// Bytes the header promised that have not been hashed yet
    pub(crate) owed: usize,
}

impl Seed {
    /// Nonce characters already hashed into the state.
    pub fn fixed(&self) -> &[u8] {
        &self.fixed
    }

    /// Nonce characters still to be chosen.
    pub fn remaining(&self) -> usize {
        self.owed.saturating_sub(1)
    }
}

impl core::fmt::Debug for Seed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Seed")
            .field("fixed", &String::from_utf8_lossy(&self.fixed))
            .field("owed", &self.owed)
            .finish_non_exhaustive()
    }
}
