//! Namespace and Event Identity
//!
//! Derives the filesystem names shared by every participant in a namespace.
//! Names are one-way SHA-256 digests rendered as lowercase hex, so they are
//! fixed-length and never contain path separators.
//!
//! ```text
//! <base-dir>/vn_<hash(namespace)>.lock
//! <base-dir>/vn_<hash(namespace)>_<hash(event)>.virtualnotify
//! ```

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "vn_";
const LOCK_EXTENSION: &str = "lock";
const MARKER_EXTENSION: &str = "virtualnotify";

/// Hex-encoded SHA-256 digest of `s`
pub fn hash_str(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

/// Lock and marker path derivation for one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    base_dir: PathBuf,
    namespace_hash: String,
}

impl PathLayout {
    pub fn new(base_dir: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            namespace_hash: hash_str(namespace),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn namespace_hash(&self) -> &str {
        &self.namespace_hash
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(format!(
            "{}{}.{}",
            FILE_PREFIX, self.namespace_hash, LOCK_EXTENSION
        ))
    }

    pub fn marker_path(&self, event_name: &str) -> PathBuf {
        self.base_dir.join(format!(
            "{}{}_{}.{}",
            FILE_PREFIX,
            self.namespace_hash,
            hash_str(event_name),
            MARKER_EXTENSION
        ))
    }
}
