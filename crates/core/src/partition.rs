//! Splitting the nonce space by fixed prefixes

use crate::alphabet::Alphabet;
use crate::error::SearchError;

/// A fixed nonce prefix; its subtree is every nonce starting with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    index: u64,
    prefix: Vec<u8>,
}

impl Partition {
    /// Position of this prefix in alphabet enumeration order.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// The `index`-th prefix of `char_len` characters, most significant first.
    fn nth(index: u64, char_len: usize, alphabet: &Alphabet) -> Self {
        let chars = alphabet.as_bytes();
        let radix = chars.len() as u64;
        let mut prefix = vec![0u8; char_len];
        let mut rest = index;
        for slot in prefix.iter_mut().rev() {
            *slot = chars[(rest % radix) as usize];
            rest /= radix;
        }
        Self { index, prefix }
    }
}

/// Number of distinct prefixes of `char_len` characters, if it fits a `u64`.
pub fn full_partition_count(char_len: usize, alphabet: &Alphabet) -> Option<u64> {
    let radix = alphabet.len() as u64;
    (0..char_len).try_fold(1u64, |acc, _| acc.checked_mul(radix))
}

/// Plan `count` disjoint partitions of `char_len` characters each.
///
/// When `count` equals the full prefix count every prefix is returned in
/// enumeration order, and the subtrees together cover the nonce space exactly
/// once. A smaller `count` picks an evenly strided subset of the prefixes.
pub fn plan(count: u64, char_len: usize, alphabet: &Alphabet) -> Result<Vec<Partition>, SearchError> {
    let full = full_partition_count(char_len, alphabet).ok_or_else(|| {
        SearchError::InvalidPartition(format!(
            "{} characters over a {}-character alphabet overflows",
            char_len,
            alphabet.len()
        ))
    })?;

    if count == 0 {
        return Err(SearchError::InvalidPartition(
            "need at least one partition".to_string(),
        ));
    }
    if count > full {
        return Err(SearchError::InvalidPartition(format!(
            "{} partitions requested but only {} prefixes of length {} exist",
            count, full, char_len
        )));
    }

    let partitions = (0..count)
        .map(|i| {
            // Exact for count == full; evenly spread otherwise
            let index = (i as u128 * full as u128 / count as u128) as u64;
            Partition::nth(index, char_len, alphabet)
        })
        .collect();

    Ok(partitions)
}
