//! Nonce alphabets

use core::fmt;
use core::str::FromStr;

use crate::error::SearchError;
use crate::params::{BASE36_CHARS, HEX_CHARS};

/// Ordered set of characters a nonce is built from.
///
/// The order is the enumeration order of the search. Characters must be
/// visible ASCII so that git keeps the trailing nonce line intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alphabet {
    chars: Vec<u8>,
}

impl Alphabet {
    pub fn new(chars: &[u8]) -> Result<Self, SearchError> {
        if chars.len() < 2 {
            return Err(SearchError::InvalidAlphabet(
                "needs at least 2 characters".to_string(),
            ));
        }

        for (i, &c) in chars.iter().enumerate() {
            if !c.is_ascii_graphic() {
                return Err(SearchError::InvalidAlphabet(format!(
                    "byte 0x{:02x} is not a visible ASCII character",
                    c
                )));
            }
            if chars[..i].contains(&c) {
                return Err(SearchError::InvalidAlphabet(format!(
                    "duplicate character {:?}",
                    c as char
                )));
            }
        }

        Ok(Self {
            chars: chars.to_vec(),
        })
    }

    /// `0-9a-z`
    pub fn base36() -> Self {
        Self {
            chars: BASE36_CHARS.to_vec(),
        }
    }

    /// `0-9a-f`
    pub fn hex() -> Self {
        Self {
            chars: HEX_CHARS.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Number of distinct nonces of `length` characters, saturating at `u64::MAX`.
    pub fn space_size(&self, length: usize) -> u64 {
        let base = self.chars.len() as u64;
        (0..length).fold(1u64, |acc, _| acc.saturating_mul(base))
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::base36()
    }
}

/// Parses `base36`, `hex`, or a literal list of characters.
impl FromStr for Alphabet {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base36" => Ok(Self::base36()),
            "hex" => Ok(Self::hex()),
            chars => Self::new(chars.as_bytes()),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Constructors only admit ASCII
        f.write_str(&String::from_utf8_lossy(&self.chars))
    }
}
