//! Event Publisher
//!
//! Publishing an event deletes its marker file; every poller watching that
//! marker sees the deletion on its next tick.
//!
//! Without a timeout a publish is fire-and-forget: a missing marker simply
//! means nobody is armed and the call succeeds. With a timeout the publisher
//! keeps retrying until some subscriber arms the marker or the deadline
//! passes. Each attempt takes the namespace lock separately so subscribers
//! can arm in between.

use log::{debug, trace};
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{NotifyError, NotifyResult};
use crate::identity::PathLayout;
use crate::lock::NamespaceLock;

/// Outcome of one delete attempt
#[derive(Debug)]
enum Attempt {
    Fired,
    NotArmed,
    Failed(io::Error),
}

/// Deletes marker files for one namespace
#[derive(Debug, Clone)]
pub struct Publisher {
    layout: PathLayout,
    lock: NamespaceLock,
    retry_delay: Duration,
}

impl Publisher {
    pub fn new(layout: PathLayout, retry_delay: Duration) -> Self {
        let lock = NamespaceLock::new(layout.lock_path());
        Self {
            layout,
            lock,
            retry_delay,
        }
    }

    /// Publish `event_name`.
    ///
    /// `timeout` of `None` or zero never waits. Permission errors are returned
    /// at once; any other failure is retried until the deadline when a timeout
    /// is given.
    pub fn publish(&self, event_name: &str, timeout: Option<Duration>) -> NotifyResult<()> {
        let path = self.layout.marker_path(event_name);

        let timeout = match timeout.filter(|t| !t.is_zero()) {
            Some(timeout) => timeout,
            None => {
                return match self.attempt(&path)? {
                    Attempt::Fired => {
                        debug!("Published '{}'", event_name);
                        Ok(())
                    }
                    Attempt::NotArmed => {
                        debug!("Published '{}' with no armed subscriber", event_name);
                        Ok(())
                    }
                    Attempt::Failed(e) => Err(NotifyError::io(&path, e)),
                };
            }
        };

        let deadline = Instant::now() + timeout;
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            match self.attempt(&path)? {
                Attempt::Fired => {
                    debug!("Published '{}' after {} attempt(s)", event_name, attempts);
                    return Ok(());
                }
                Attempt::Failed(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    return Err(NotifyError::io(&path, e));
                }
                Attempt::Failed(e) => trace!("Publish '{}' attempt failed: {}", event_name, e),
                Attempt::NotArmed => {}
            }

            if Instant::now() >= deadline {
                debug!("Publish '{}' timed out after {} attempt(s)", event_name, attempts);
                return Err(NotifyError::timeout(event_name, timeout));
            }
            if self.retry_delay.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(self.retry_delay.min(deadline.saturating_duration_since(Instant::now())));
            }
        }
    }

    fn attempt(&self, path: &Path) -> NotifyResult<Attempt> {
        let _guard = self.lock.acquire()?;
        Ok(match fs::remove_file(path) {
            Ok(()) => Attempt::Fired,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Attempt::NotArmed,
            Err(e) => Attempt::Failed(e),
        })
    }
}
