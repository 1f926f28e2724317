//! Subscribe, unsubscribe, cleanup and close behaviour

#[path = "common.rs"]
mod common;

use common::{marker_count, notifier, DELIVERY_TIMEOUT, POLL_INTERVAL};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_subscribe_twice_creates_one_marker_and_one_event() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("e1").unwrap();
    subscriber.subscribe("e1").unwrap();
    assert_eq!(marker_count(dir.path()), 1);
    assert_eq!(subscriber.subscriptions(), vec!["e1".to_string()]);

    subscriber.spawn(POLL_INTERVAL).unwrap();
    notifier(&dir, "test").publish("e1").unwrap();

    assert!(subscriber.next_timeout(DELIVERY_TIMEOUT).unwrap().is_some());
    assert_eq!(subscriber.next_timeout(POLL_INTERVAL * 4).unwrap(), None);
}

#[test]
fn test_unsubscribed_instance_gets_no_event() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();

    subscriber.unsubscribe("e1");
    assert!(!subscriber.layout().marker_path("e1").exists());

    notifier(&dir, "test").publish("e1").unwrap();

    assert_eq!(subscriber.next_timeout(POLL_INTERVAL * 4).unwrap(), None);
}

#[test]
fn test_close_removes_only_own_markers() {
    let dir = TempDir::new().unwrap();
    let ours = notifier(&dir, "test");
    let theirs = notifier(&dir, "test");
    ours.subscribe("a").unwrap();
    ours.subscribe("b").unwrap();
    theirs.subscribe("c").unwrap();
    assert_eq!(marker_count(dir.path()), 3);

    ours.close();

    assert_eq!(marker_count(dir.path()), 1);
    assert!(theirs.layout().marker_path("c").exists());
}

#[test]
fn test_next_after_close_does_not_block() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();

    subscriber.close();

    let started = Instant::now();
    assert!(subscriber.next().unwrap_err().is_closed());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_close_wakes_blocked_consumer() {
    let dir = TempDir::new().unwrap();
    let subscriber = Arc::new(notifier(&dir, "test"));
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();

    let consumer = {
        let subscriber = Arc::clone(&subscriber);
        thread::spawn(move || subscriber.next())
    };
    thread::sleep(POLL_INTERVAL * 2);
    subscriber.close();

    assert!(consumer.join().unwrap().unwrap_err().is_closed());
}

#[test]
fn test_close_with_full_queue_does_not_hang() {
    let dir = TempDir::new().unwrap();
    let config = vnotify::NotifyConfig {
        queue_capacity: 1,
        ..common::config(dir.path())
    };
    let subscriber = vnotify::VirtualNotify::with_config("test", config).unwrap();
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();
    let publisher = notifier(&dir, "test");

    // Fill the queue, then fire again so the poller blocks on the full queue
    for _ in 0..2 {
        publisher.publish_timeout("e1", DELIVERY_TIMEOUT).unwrap();
        thread::sleep(POLL_INTERVAL * 3);
    }

    subscriber.close();
    assert!(subscriber.is_closed());
}

#[test]
fn test_full_queue_does_not_block_other_publishers() {
    let dir = TempDir::new().unwrap();
    let config = vnotify::NotifyConfig {
        queue_capacity: 1,
        ..common::config(dir.path())
    };
    let subscriber = vnotify::VirtualNotify::with_config("test", config).unwrap();
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();
    let publisher = notifier(&dir, "test");

    // First event fills the queue, the second leaves the poller blocked on it
    for _ in 0..2 {
        publisher.publish_timeout("e1", DELIVERY_TIMEOUT).unwrap();
        thread::sleep(POLL_INTERVAL * 3);
    }

    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    let other = notifier(&dir, "test");
    thread::spawn(move || {
        let _ = done_tx.send(other.publish("unrelated").is_ok());
    });
    assert_eq!(done_rx.recv_timeout(Duration::from_secs(3)), Ok(true));

    // The blocked poller already re-armed e1, so a waiting publish still lands
    publisher.publish_timeout("e1", DELIVERY_TIMEOUT).unwrap();

    assert_eq!(subscriber.next().unwrap().name(), "e1");
    subscriber.close();
}
