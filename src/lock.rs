//! Advisory Namespace Lock
//!
//! One lock file per namespace serializes every mutation of marker state.
//! The lock is cooperative: only processes going through this module honour it.
//!
//! Each acquisition opens its own handle on the lock file. `flock` locks belong
//! to the open file description, so two threads of the same process exclude each
//! other just like two processes do.

use fs2::FileExt;
use log::{trace, warn};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{NotifyError, NotifyResult};

/// Lock file handle for one namespace
#[derive(Debug, Clone)]
pub struct NamespaceLock {
    path: PathBuf,
}

impl NamespaceLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the exclusive lock is held.
    ///
    /// The lock file is created on first use and left on disk afterwards.
    pub fn acquire(&self) -> NotifyResult<LockGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| NotifyError::lock(&self.path, e))?;

        file.lock_exclusive()
            .map_err(|e| NotifyError::lock(&self.path, e))?;

        trace!("Acquired namespace lock {}", self.path.display());
        Ok(LockGuard {
            file,
            path: self.path.clone(),
        })
    }
}

/// Held namespace lock; released when dropped
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well; unlock explicitly so a
        // failure is at least visible in the log.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        } else {
            trace!("Released namespace lock {}", self.path.display());
        }
    }
}
