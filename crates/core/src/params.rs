//! Search parameters and git object constants

/// Object type tag that starts a commit's loose-object header
pub const OBJECT_KIND: &[u8] = b"commit";

/// Byte appended after the nonce, terminating the message
pub const NONCE_TERMINATOR: u8 = b'\n';

/// SHA-1 digest size in bytes
pub const DIGEST_SIZE: usize = 20;

/// Longest accepted prefix in hex characters (fits a 32-bit comparison window)
pub const MAX_PREFIX_LEN: usize = 8;

/// Nonce characters added on top of the prefix length when none is given.
///
/// Each base36 character carries ~5.2 bits against the 4 bits each prefix
/// character costs, so two extra characters leave a wide margin.
pub const DEFAULT_EXTRA_NONCE_CHARS: usize = 2;

/// Default nonce alphabet: digits then lowercase letters
pub const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase hex digits
pub const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Longest accepted nonce in characters, partition prefix included
pub const MAX_NONCE_LEN: usize = 64;
