//! End-to-end publish/subscribe through marker files

#[path = "common.rs"]
mod common;

use common::{marker_count, notifier, wait_until, DELIVERY_TIMEOUT, POLL_INTERVAL};
use std::thread;
use std::time::Instant;
use tempfile::TempDir;

#[test]
fn test_publish_reaches_subscriber_and_rearms() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();

    let publisher = notifier(&dir, "test");
    let started = Instant::now();
    publisher.publish("e1").unwrap();

    let event = subscriber
        .next_timeout(DELIVERY_TIMEOUT)
        .unwrap()
        .expect("event should be delivered");
    assert_eq!(event.name(), "e1");
    assert!(started.elapsed() < DELIVERY_TIMEOUT);
    assert!(
        wait_until(DELIVERY_TIMEOUT, || event.marker_path().exists()),
        "marker should be re-armed after delivery"
    );

    subscriber.close();
}

#[test]
fn test_repeated_publishes_are_each_delivered() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("tick").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();
    let publisher = notifier(&dir, "test");

    for _ in 0..3 {
        // Waiting publish succeeds once the poller has re-armed the marker
        publisher.publish_timeout("tick", DELIVERY_TIMEOUT).unwrap();
        let event = subscriber.next_timeout(DELIVERY_TIMEOUT).unwrap().expect("event");
        assert_eq!(event.name(), "tick");
    }
}

#[test]
fn test_subscribers_share_one_marker() {
    let dir = TempDir::new().unwrap();
    let first = notifier(&dir, "test");
    let second = notifier(&dir, "test");
    for sub in [&first, &second] {
        sub.subscribe("e1").unwrap();
        sub.spawn(POLL_INTERVAL).unwrap();
    }
    assert_eq!(marker_count(dir.path()), 1);

    notifier(&dir, "test").publish("e1").unwrap();

    // Whichever poller ticks first re-arms the shared marker; the other one
    // only sees the publish if it ticked in between. At least one must.
    let deadline = Instant::now() + DELIVERY_TIMEOUT;
    let mut delivered = 0;
    while delivered == 0 && Instant::now() < deadline {
        for sub in [&first, &second] {
            if sub.next_timeout(POLL_INTERVAL).unwrap().is_some() {
                delivered += 1;
            }
        }
    }
    assert!(delivered >= 1);
    assert!(wait_until(DELIVERY_TIMEOUT, || first.layout().marker_path("e1").exists()));
}

#[test]
fn test_events_only_for_subscribed_names() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "test");
    subscriber.subscribe("wanted").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();
    let publisher = notifier(&dir, "test");

    publisher.publish("other").unwrap();
    publisher.publish("wanted").unwrap();

    let event = subscriber.next_timeout(DELIVERY_TIMEOUT).unwrap().expect("event");
    assert_eq!(event.name(), "wanted");
    assert_eq!(subscriber.next_timeout(POLL_INTERVAL * 4).unwrap(), None);
}

#[test]
fn test_namespaces_do_not_cross_talk() {
    let dir = TempDir::new().unwrap();
    let subscriber = notifier(&dir, "alpha");
    subscriber.subscribe("e1").unwrap();
    subscriber.spawn(POLL_INTERVAL).unwrap();

    notifier(&dir, "beta").publish("e1").unwrap();

    assert_eq!(subscriber.next_timeout(POLL_INTERVAL * 4).unwrap(), None);
}

#[test]
fn test_wait_for_event_returns_after_publish() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let publisher = notifier(&dir, "test");

    let waiter = thread::spawn(move || vnotify::wait_for_event_with(config, "test", "ready"));

    publisher.publish_timeout("ready", DELIVERY_TIMEOUT).unwrap();
    waiter.join().unwrap().unwrap();

    assert_eq!(marker_count(dir.path()), 0, "waiter cleans up its marker");
}
