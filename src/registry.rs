//! Subscription Registry
//!
//! Tracks which events this instance watches and owns the marker files behind
//! them. Every mutation happens under the namespace lock, then the in-process
//! mutex, always in that order.

use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{NotifyError, NotifyResult};
use crate::identity::PathLayout;
use crate::lock::{LockGuard, NamespaceLock};

/// Create (or truncate) a zero-length marker file, arming the event
pub(crate) fn arm_marker(path: &Path) -> NotifyResult<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| NotifyError::io(path, e))
}

/// Remove a marker file, treating an already missing file as success
fn disarm_marker(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// In-process set of (event name, marker path) pairs watched by one instance
#[derive(Debug)]
pub struct SubscriptionRegistry {
    layout: PathLayout,
    lock: NamespaceLock,
    subs: Mutex<HashMap<String, PathBuf>>,
}

/// Subscription set held under both the namespace lock and the registry mutex
pub(crate) struct LockedSubscriptions<'a> {
    // Field order matters: the mutex is released before the namespace lock.
    subs: MutexGuard<'a, HashMap<String, PathBuf>>,
    _lock: LockGuard,
}

impl LockedSubscriptions<'_> {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.subs.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

impl SubscriptionRegistry {
    pub fn new(layout: PathLayout) -> Self {
        let lock = NamespaceLock::new(layout.lock_path());
        Self {
            layout,
            lock,
            subs: Mutex::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &PathLayout {
        &self.layout
    }

    pub(crate) fn locked(&self) -> NotifyResult<LockedSubscriptions<'_>> {
        let guard = self.lock.acquire()?;
        Ok(LockedSubscriptions {
            subs: self.subs.lock(),
            _lock: guard,
        })
    }

    /// Arm a marker for `event_name` and start tracking it.
    ///
    /// Subscribing to an event already tracked is a no-op. The subscription is
    /// only recorded once the marker file exists.
    pub fn subscribe(&self, event_name: &str) -> NotifyResult<()> {
        let mut locked = self.locked()?;
        if locked.subs.contains_key(event_name) {
            debug!("Already subscribed to '{}'", event_name);
            return Ok(());
        }

        let path = self.layout.marker_path(event_name);
        arm_marker(&path)?;
        debug!("Subscribed to '{}' ({})", event_name, path.display());
        locked.subs.insert(event_name.to_string(), path);
        Ok(())
    }

    /// Stop tracking `event_name` and delete its marker. Failures are logged only.
    pub fn unsubscribe(&self, event_name: &str) {
        match self.locked() {
            Ok(mut locked) => Self::unsubscribe_locked(&mut locked.subs, event_name),
            Err(e) => {
                // Without the lock the marker is left alone.
                warn!("Unsubscribe '{}' skipped marker removal: {}", event_name, e);
                self.subs.lock().remove(event_name);
            }
        }
    }

    /// Unsubscribe from everything this instance tracks
    pub fn cleanup(&self) {
        match self.locked() {
            Ok(mut locked) => {
                let names: Vec<String> = locked.subs.keys().cloned().collect();
                for name in names {
                    Self::unsubscribe_locked(&mut locked.subs, &name);
                }
            }
            Err(e) => {
                warn!("Cleanup skipped marker removal: {}", e);
                self.subs.lock().clear();
            }
        }
    }

    fn unsubscribe_locked(subs: &mut HashMap<String, PathBuf>, event_name: &str) {
        let Some(path) = subs.remove(event_name) else {
            return;
        };
        match disarm_marker(&path) {
            Ok(()) => debug!("Unsubscribed from '{}'", event_name),
            Err(e) => warn!("Failed to remove marker {}: {}", path.display(), e),
        }
    }

    pub fn is_subscribed(&self, event_name: &str) -> bool {
        self.subs.lock().contains_key(event_name)
    }

    /// Sorted snapshot of subscribed event names
    pub fn subscriptions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.subs.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.subs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
