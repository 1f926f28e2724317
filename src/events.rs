//! Event Queue
//!
//! Bounded hand-off between the poller thread and consumers. Closing is
//! observable: once closed, or once every sender is gone, `next()` returns
//! [`NotifyError::Closed`] instead of blocking.

use crossbeam_channel::{bounded, select, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NotifyError, NotifyResult};

/// A detected publish of one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    path: PathBuf,
}

impl Event {
    pub(crate) fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marker file whose disappearance produced this event
    pub fn marker_path(&self) -> &Path {
        &self.path
    }
}

/// Create a bounded event queue
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = bounded(capacity);
    (
        EventSender { tx },
        EventReceiver {
            rx,
            closed: Arc::new(AtomicBool::new(false)),
        },
    )
}

/// Producing end, held by pollers
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Queue an event, blocking while the queue is full.
    ///
    /// Returns `false` without queueing if `stop` fires or every receiver is gone.
    pub fn send(&self, event: Event, stop: &Receiver<()>) -> bool {
        select! {
            send(self.tx, event) -> res => res.is_ok(),
            recv(stop) -> _ => false,
        }
    }
}

/// Consuming end
#[derive(Debug, Clone)]
pub struct EventReceiver {
    rx: Receiver<Event>,
    closed: Arc<AtomicBool>,
}

impl EventReceiver {
    /// Block until an event arrives or the queue is closed
    pub fn next(&self) -> NotifyResult<Event> {
        if self.is_closed() {
            return Err(NotifyError::Closed);
        }
        self.rx.recv().map_err(|_| NotifyError::Closed)
    }

    /// Like [`next`](Self::next) but gives up after `timeout` with `Ok(None)`
    pub fn next_timeout(&self, timeout: Duration) -> NotifyResult<Option<Event>> {
        if self.is_closed() {
            return Err(NotifyError::Closed);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(NotifyError::Closed),
        }
    }

    /// Non-blocking poll of the queue
    pub fn try_next(&self) -> NotifyResult<Option<Event>> {
        if self.is_closed() {
            return Err(NotifyError::Closed);
        }
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(NotifyError::Closed),
        }
    }

    /// Mark the queue closed. Receivers already blocked wake once all senders drop.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of events waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Raw channel end, for use in `select!`
    pub fn as_receiver(&self) -> &Receiver<Event> {
        &self.rx
    }
}
