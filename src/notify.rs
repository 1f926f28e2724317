//! Notifier Facade
//!
//! [`VirtualNotify`] ties the pieces together for one namespace: a
//! subscription registry, a publisher, an event queue and any number of
//! pollers feeding that queue.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vnotify::VirtualNotify;
//!
//! # fn main() -> vnotify::NotifyResult<()> {
//! let notifier = VirtualNotify::new("test")?;
//! notifier.subscribe("e1")?;
//! notifier.spawn(Duration::from_millis(50))?;
//!
//! let event = notifier.next()?;
//! println!("event: {}", event.name());
//! notifier.close();
//! # Ok(())
//! # }
//! ```

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::NotifyConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::events::{self, Event, EventReceiver, EventSender};
use crate::identity::PathLayout;
use crate::poller::{self, Poller};
use crate::publisher::Publisher;
use crate::registry::SubscriptionRegistry;

/// Cross-process notifier bound to one namespace
pub struct VirtualNotify {
    namespace: String,
    config: NotifyConfig,
    registry: Arc<SubscriptionRegistry>,
    publisher: Publisher,
    events: EventReceiver,
    sender: Mutex<Option<EventSender>>,
    // Dropping the sender disconnects every poller's stop receiver.
    stop_tx: Mutex<Option<Sender<()>>>,
    stop_rx: Receiver<()>,
    workers: Mutex<Vec<JoinHandle<NotifyResult<()>>>>,
    closed: AtomicBool,
}

impl VirtualNotify {
    /// Notifier for `namespace` with default settings
    pub fn new(namespace: &str) -> NotifyResult<Self> {
        Self::with_config(namespace, NotifyConfig::default())
    }

    pub fn with_config(namespace: &str, config: NotifyConfig) -> NotifyResult<Self> {
        config.validate()?;

        let layout = PathLayout::new(&config.base_dir, namespace);
        let publisher = Publisher::new(layout.clone(), config.publish_retry_delay);
        let registry = Arc::new(SubscriptionRegistry::new(layout));
        let (sender, events) = events::channel(config.queue_capacity);
        let (stop_tx, stop_rx) = bounded(0);

        debug!(
            "Created notifier for namespace '{}' in {}",
            namespace,
            config.base_dir.display()
        );

        Ok(Self {
            namespace: namespace.to_string(),
            config,
            registry,
            publisher,
            events,
            sender: Mutex::new(Some(sender)),
            stop_tx: Mutex::new(Some(stop_tx)),
            stop_rx,
            workers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    pub fn layout(&self) -> &PathLayout {
        self.registry.layout()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> NotifyResult<()> {
        if self.is_closed() {
            Err(NotifyError::Closed)
        } else {
            Ok(())
        }
    }

    pub fn subscribe(&self, event_name: &str) -> NotifyResult<()> {
        self.ensure_open()?;
        self.registry.subscribe(event_name)
    }

    /// Best-effort; failures are only logged
    pub fn unsubscribe(&self, event_name: &str) {
        self.registry.unsubscribe(event_name);
    }

    /// Sorted names of subscribed events
    pub fn subscriptions(&self) -> Vec<String> {
        self.registry.subscriptions()
    }

    /// Fire-and-forget publish
    pub fn publish(&self, event_name: &str) -> NotifyResult<()> {
        self.publisher.publish(event_name, None)
    }

    /// Publish, waiting up to `timeout` for a subscriber to arm the event.
    /// A zero timeout behaves like [`publish`](Self::publish).
    pub fn publish_timeout(&self, event_name: &str, timeout: Duration) -> NotifyResult<()> {
        self.publisher.publish(event_name, Some(timeout))
    }

    fn poller(&self, interval: Duration) -> NotifyResult<Poller> {
        let sender = self.sender.lock().clone().ok_or(NotifyError::Closed)?;
        Ok(Poller::new(
            Arc::clone(&self.registry),
            sender,
            self.stop_rx.clone(),
            interval,
        ))
    }

    /// Poll on the calling thread until [`close`](Self::close) is called.
    ///
    /// Returns early with an error if a marker cannot be re-armed.
    pub fn run(&self, interval: Duration) -> NotifyResult<()> {
        self.ensure_open()?;
        let result = self.poller(interval)?.run();
        poller::log_exit(&result);
        result
    }

    /// Poll on a background thread; [`close`](Self::close) joins it
    pub fn spawn(&self, interval: Duration) -> NotifyResult<()> {
        self.ensure_open()?;
        let worker = self.poller(interval)?;
        let handle = thread::Builder::new()
            .name(format!("vnotify-poller-{}", self.namespace))
            .spawn(move || {
                let result = worker.run();
                poller::log_exit(&result);
                result
            })
            .map_err(|e| NotifyError::io(self.layout().base_dir(), e))?;
        self.workers.lock().push(handle);
        Ok(())
    }

    /// Block until an event arrives; [`NotifyError::Closed`] once closed
    pub fn next(&self) -> NotifyResult<Event> {
        self.events.next()
    }

    pub fn next_timeout(&self, timeout: Duration) -> NotifyResult<Option<Event>> {
        self.events.next_timeout(timeout)
    }

    pub fn try_next(&self) -> NotifyResult<Option<Event>> {
        self.events.try_next()
    }

    /// Receiving end of the event queue
    pub fn events(&self) -> &EventReceiver {
        &self.events
    }

    /// Stop polling, unsubscribe everything and close the queue.
    ///
    /// Calling it again is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.events.close();
        self.stop_tx.lock().take();
        self.sender.lock().take();

        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in workers {
            if handle.join().is_err() {
                error!("Poller thread panicked");
            }
        }

        self.registry.cleanup();
        debug!("Closed notifier for namespace '{}'", self.namespace);
    }
}

impl Drop for VirtualNotify {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for VirtualNotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualNotify")
            .field("namespace", &self.namespace)
            .field("base_dir", &self.config.base_dir)
            .field("subscriptions", &self.registry.subscriptions())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Block until `event_name` is published in `namespace`, using default settings
pub fn wait_for_event(namespace: &str, event_name: &str) -> NotifyResult<()> {
    wait_for_event_with(NotifyConfig::default(), namespace, event_name)
}

/// Subscribe, poll at `config.poll_interval`, wait for `event_name`, then clean up
pub fn wait_for_event_with(
    config: NotifyConfig,
    namespace: &str,
    event_name: &str,
) -> NotifyResult<()> {
    let interval = config.poll_interval;
    let notifier = VirtualNotify::with_config(namespace, config)?;
    notifier.subscribe(event_name)?;
    notifier.spawn(interval)?;

    loop {
        let event = notifier.next()?;
        if event.name() == event_name {
            debug!("Received awaited event '{}'", event_name);
            notifier.close();
            return Ok(());
        }
    }
}
