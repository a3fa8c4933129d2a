//! Target hex prefix for the commit id

use core::fmt;
use core::str::FromStr;

use crate::error::SearchError;
use crate::params::{DIGEST_SIZE, MAX_PREFIX_LEN};

/// A lowercase hex prefix of 1 to [`MAX_PREFIX_LEN`] characters.
///
/// Matching is done on raw digest bytes: whole bytes compare directly and an
/// odd trailing character compares against the high nibble of the next byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DesiredPrefix {
    text: String,
    /// Complete bytes of the prefix
    bytes: Vec<u8>,
    /// Trailing odd nibble, already shifted into the high half
    half_byte: Option<u8>,
}

impl DesiredPrefix {
    pub fn new(prefix: &str) -> Result<Self, SearchError> {
        let invalid = |reason| SearchError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason,
        };

        if prefix.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if prefix.len() > MAX_PREFIX_LEN {
            return Err(invalid("longer than 8 hex characters"));
        }
        if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("not a hex string"));
        }

        let text = prefix.to_ascii_lowercase();
        let nibbles: Vec<u8> = text.bytes().map(hex_value).collect();
        let bytes = nibbles
            .chunks_exact(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect();
        let half_byte = if nibbles.len() % 2 == 1 {
            nibbles.last().map(|n| n << 4)
        } else {
            None
        };

        Ok(Self {
            text,
            bytes,
            half_byte,
        })
    }

    /// Number of hex characters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check whether a raw digest's hex form starts with this prefix.
    #[inline(always)]
    pub fn matches(&self, digest: &[u8; DIGEST_SIZE]) -> bool {
        let full = self.bytes.len();
        digest[..full] == self.bytes[..]
            && match self.half_byte {
                Some(high) => digest[full] & 0xf0 == high,
                None => true,
            }
    }
}

/// Value of one lowercase hex digit.
///
/// Decoded per nibble because `hex::decode` rejects odd-length input.
#[inline]
fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        _ => c - b'a' + 10,
    }
}

impl FromStr for DesiredPrefix {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for DesiredPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
