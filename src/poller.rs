//! Marker Poller
//!
//! Periodically scans the subscription set. A missing marker means the event
//! was published: the poller queues an [`Event`] and re-creates the marker so
//! the next publish can be seen too.
//!
//! The stat and re-arm pass of a tick runs under the namespace lock, which
//! keeps it consistent with this instance's own subscribe/unsubscribe calls.
//! Fired events are queued only after the lock is released, so a slow
//! consumer never stalls other participants in the namespace.
//!
//! A publisher in another process may still delete the marker between two
//! ticks or right after a re-arm, and another process's poller may re-arm a
//! shared marker first. Delivery is therefore at-least-once at best: events
//! can be duplicated or missed.

use crossbeam_channel::{select, tick, Receiver};
use log::{debug, error, trace, warn};
use std::fs;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NotifyError, NotifyResult};
use crate::events::{Event, EventSender};
use crate::registry::{arm_marker, SubscriptionRegistry};

/// Result of a single scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scan finished; number of events queued
    Completed(usize),
    /// Stop was signalled while queueing an event
    Stopped,
}

/// Poll loop for one instance
pub struct Poller {
    registry: Arc<SubscriptionRegistry>,
    events: EventSender,
    stop: Receiver<()>,
    interval: Duration,
}

impl Poller {
    /// `stop` ends the loop when it receives a value or is disconnected
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        events: EventSender,
        stop: Receiver<()>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            events,
            stop,
            interval,
        }
    }

    /// Run until stopped.
    ///
    /// Returns an error if the namespace lock cannot be taken or a marker cannot
    /// be re-armed; the loop does not retry those.
    pub fn run(self) -> NotifyResult<()> {
        debug!(
            "Poller started for namespace {} (interval {:?})",
            self.registry.layout().namespace_hash(),
            self.interval
        );
        let ticker = tick(self.interval);

        loop {
            select! {
                recv(self.stop) -> _ => break,
                recv(ticker) -> _ => {
                    if self.tick()? == TickOutcome::Stopped {
                        break;
                    }
                }
            }
        }

        debug!("Poller stopped");
        Ok(())
    }

    /// Scan every subscription once
    pub fn tick(&self) -> NotifyResult<TickOutcome> {
        let (fired, rearm_error) = self.scan()?;
        let count = fired.len();

        for event in fired {
            if !self.events.send(event, &self.stop) {
                return Ok(TickOutcome::Stopped);
            }
        }

        if let Some(e) = rearm_error {
            return Err(e);
        }

        trace!("Tick complete, {} event(s) fired", count);
        Ok(TickOutcome::Completed(count))
    }

    /// Stat and re-arm under the namespace lock, collecting fired events.
    ///
    /// A failed re-arm ends the scan; events fired up to and including that
    /// marker are still returned.
    fn scan(&self) -> NotifyResult<(Vec<Event>, Option<NotifyError>)> {
        let subs = self.registry.locked()?;
        let mut fired = Vec::new();

        for (name, path) in subs.iter() {
            match fs::metadata(path) {
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Cannot stat marker {}: {}", path.display(), e);
                    continue;
                }
            }

            debug!("Event '{}' fired", name);
            fired.push(Event::new(name, path));

            if let Err(e) = arm_marker(path) {
                error!("Failed to re-arm '{}', stopping poller: {}", name, e);
                return Ok((fired, Some(e)));
            }
        }

        Ok((fired, None))
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("namespace", &self.registry.layout().namespace_hash())
            .field("interval", &self.interval)
            .finish()
    }
}

/// Log how a background poller ended
pub(crate) fn log_exit(result: &NotifyResult<()>) {
    match result {
        Ok(()) => {}
        Err(NotifyError::Closed) => debug!("Poller exited: closed"),
        Err(e) => error!("Poller exited with error: {}", e),
    }
}
