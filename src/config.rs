//! Miner configuration
//!
//! Loaded from an optional JSON file, then overridden by command-line flags.
//!
//! ```json
//! {
//!   "alphabet": "base36",
//!   "nonce_length": 8,
//!   "partition_chars": 1,
//!   "workers": 8,
//!   "timeout_secs": 600
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vanity_core::Alphabet;

use crate::error::VanityError;

/// Default number of leading nonce characters used to split work
pub const DEFAULT_PARTITION_CHARS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// `base36`, `hex`, or the literal characters to use
    pub alphabet: String,
    /// Nonce characters to append (default: prefix length + 2)
    pub nonce_length: Option<usize>,
    /// Leading nonce characters fixed per partition
    pub partition_chars: usize,
    /// Worker threads (default: number of CPU cores); 1 searches single-threaded
    pub workers: Option<usize>,
    /// Give up after this many seconds
    pub timeout_secs: Option<u64>,
    /// Search only, leave the commit untouched
    pub dry_run: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            alphabet: "base36".to_string(),
            nonce_length: None,
            partition_chars: DEFAULT_PARTITION_CHARS,
            workers: None,
            timeout_secs: None,
            dry_run: false,
        }
    }
}

impl MinerConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, VanityError> {
        let text = fs::read_to_string(path).map_err(|e| VanityError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| VanityError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, VanityError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn alphabet(&self) -> Result<Alphabet, VanityError> {
        Ok(self.alphabet.parse()?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `<config dir>/vanity-commit/config.json`
#[cfg(feature = "cli")]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vanity-commit").join("config.json"))
}

/// Config path used when none is given on the command line.
#[cfg(not(feature = "cli"))]
pub fn default_config_path() -> Option<PathBuf> {
    None
}
