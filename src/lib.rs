//! Cross-process event notification using only the filesystem.
//!
//! A subscriber arms an event by creating a marker file; a publisher fires it
//! by deleting that file; the subscriber's poller notices the absence, queues
//! an [`Event`] locally and re-arms the marker. An advisory lock file per
//! namespace serializes the mutations.

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod lock;
pub mod logging;
pub mod notify;
pub mod poller;
pub mod publisher;
pub mod registry;

pub use config::NotifyConfig;
pub use error::{NotifyError, NotifyResult};
pub use events::Event;
pub use notify::{wait_for_event, wait_for_event_with, VirtualNotify};
