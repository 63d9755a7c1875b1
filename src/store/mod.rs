//! Backing stores holding the catalog, the score files and the output.
//!
//! A [`Store`] is constructed by the caller and handed to the pipeline; the
//! library never reaches for a process-wide client. Keys are `/`-separated
//! relative paths such as `partitions_individuelles/waltz-1.pdf`.
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | Local directory | [`local`] | atomic temp-file + rename writes |
//! | In-memory map | [`memory`] | tests and dry runs |
//! | S3-compatible bucket | `s3` | requires the `s3` feature |

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStore;
pub use memory::MemoryStore;
#[cfg(feature = "s3")]
pub use s3::{S3Settings, S3Store};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Outcome of probing a key.
///
/// Absence is a normal answer rather than an error, so callers can skip
/// missing score files without inspecting error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Found,
    Missing,
}

impl Presence {
    pub fn is_found(self) -> bool {
        matches!(self, Presence::Found)
    }
}

/// Minimal blocking key/value interface the booklet pipeline needs.
pub trait Store: Send + Sync {
    /// Check whether `key` exists.
    ///
    /// Errors are reserved for an unreachable or failing backend.
    fn probe(&self, key: &str) -> Result<Presence>;

    /// Read the full contents of `key`.
    fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite `key` with `bytes`.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of `key`, used in logs and the CLI summary.
    fn describe(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Join a prefix and a name into a store key.
///
/// Empty prefixes yield the bare name; redundant slashes are collapsed at the
/// seam.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
