//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use vnotify::{NotifyConfig, VirtualNotify};

pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Generous bound for "within roughly one polling interval" on a loaded machine
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn config(dir: &Path) -> NotifyConfig {
    NotifyConfig::builder()
        .with_base_dir(dir)
        .with_poll_interval(POLL_INTERVAL)
        .build()
        .expect("valid test config")
}

pub fn notifier(dir: &TempDir, namespace: &str) -> VirtualNotify {
    VirtualNotify::with_config(namespace, config(dir.path())).expect("notifier")
}

/// Count marker files currently present in `dir`
pub fn marker_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "virtualnotify"))
        .count()
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
