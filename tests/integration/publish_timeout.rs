//! Publishing with and without a wait for subscribers

#[path = "common.rs"]
mod common;

use common::{notifier, DELIVERY_TIMEOUT, POLL_INTERVAL};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_publish_without_subscriber_succeeds_immediately() {
    let dir = TempDir::new().unwrap();
    let publisher = notifier(&dir, "test");

    let started = Instant::now();
    publisher.publish("nobody-listens").unwrap();
    publisher.publish_timeout("nobody-listens", Duration::ZERO).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_publish_timeout_without_subscriber() {
    let dir = TempDir::new().unwrap();
    let publisher = notifier(&dir, "test");
    let timeout = Duration::from_millis(200);

    let started = Instant::now();
    let err = publisher.publish_timeout("e1", timeout).unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {}", err);
    assert!(started.elapsed() >= timeout);
    assert!(started.elapsed() < timeout + Duration::from_secs(2));
}

#[test]
fn test_publish_timeout_waits_for_late_subscriber() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    let publisher = notifier(&dir, "test");

    let late = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        subscriber.subscribe("e1").unwrap();
        subscriber.spawn(POLL_INTERVAL).unwrap();
        subscriber.next_timeout(DELIVERY_TIMEOUT)
    });

    publisher.publish_timeout("e1", DELIVERY_TIMEOUT).unwrap();

    let event = late.join().unwrap().unwrap().expect("late subscriber should see the publish");
    assert_eq!(event.name(), "e1");
}

#[cfg(unix)]
#[test]
fn test_publish_permission_error_is_not_retried() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("e1").unwrap();

    // Removing a file needs write permission on its directory
    let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
    perms.set_mode(0o555);
    std::fs::set_permissions(dir.path(), perms.clone()).unwrap();

    let started = Instant::now();
    let result = notifier(&dir, "test").publish_timeout("e1", Duration::from_secs(5));

    perms.set_mode(0o755);
    std::fs::set_permissions(dir.path(), perms).unwrap();

    // Root ignores directory permissions; only check when the removal was denied
    if let Err(err) = result {
        assert!(!err.is_timeout(), "permission errors must not wait for the deadline");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
