//! Subcommand execution

use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Duration;
use vnotify::cli::Command;
use vnotify::{wait_for_event_with, NotifyConfig, VirtualNotify};

pub fn run_command(command: &Command, namespace: &str, config: NotifyConfig) -> Result<()> {
    match command {
        Command::Publish { event, timeout } => publish(namespace, config, event, *timeout),
        Command::Subscribe { events, interval, count } => {
            subscribe(namespace, config, events, *interval, *count)
        }
        Command::Wait { event, interval } => {
            let mut config = config;
            if let Some(interval) = interval {
                config.poll_interval = *interval;
            }
            info!("Waiting for '{}' in namespace '{}'", event, namespace);
            wait_for_event_with(config, namespace, event)
                .with_context(|| format!("Failed waiting for event '{}'", event))?;
            println!("event: {}", event);
            Ok(())
        }
    }
}

fn publish(namespace: &str, config: NotifyConfig, event: &str, timeout: Option<Duration>) -> Result<()> {
    let notifier = VirtualNotify::with_config(namespace, config)?;
    match timeout {
        Some(timeout) => notifier.publish_timeout(event, timeout),
        None => notifier.publish(event),
    }
    .with_context(|| format!("Failed to publish event '{}'", event))?;
    info!("Published '{}' in namespace '{}'", event, namespace);
    Ok(())
}

fn subscribe(
    namespace: &str,
    config: NotifyConfig,
    events: &[String],
    interval: Option<Duration>,
    count: Option<usize>,
) -> Result<()> {
    let interval = interval.unwrap_or(config.poll_interval);
    let notifier = VirtualNotify::with_config(namespace, config)?;

    for event in events {
        notifier
            .subscribe(event)
            .with_context(|| format!("Failed to subscribe to event '{}'", event))?;
    }
    notifier.spawn(interval)?;
    info!("Subscribed to {:?} in namespace '{}'", events, namespace);

    let mut received = 0;
    loop {
        let event = notifier.next().context("Event queue closed")?;
        println!("event: {}", event.name());
        received += 1;
        if count.is_some_and(|limit| received >= limit) {
            debug!("Received {} event(s), exiting", received);
            break;
        }
    }

    notifier.close();
    Ok(())
}
