// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Graceful shutdown plumbing
//!
//! One [`ShutdownTrigger`] per process, held by `main`. Background tasks get
//! a [`ShutdownSignal`] and stop when it fires.

use tokio::sync::watch;

use crate::error::Result;

/// Creates a connected trigger/signal pair
#[must_use]
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Sending half of the shutdown channel
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Fires the signal for every subscriber. Idempotent.
    pub fn trigger(&self) {
        // Nobody listening is fine: there is nothing left to stop
        let _ = self.tx.send(true);
    }
}

/// Receiving half of the shutdown channel
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested, or the trigger was dropped.
    ///
    /// Cancel safe: it can sit in a `select!` that is polled repeatedly.
    pub async fn triggered(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                tracing::debug!("Shutdown trigger dropped");
                return;
            }
        }
    }
}

/// Waits for SIGINT or SIGTERM (Ctrl-C on non-Unix platforms)
///
/// # Errors
///
/// Returns [`crate::AppError::Io`] when the signal handlers cannot be
/// installed.
#[cfg(unix)]
pub async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => tracing::info!("Received SIGINT"),
        _ = terminate.recv() => tracing::info!("Received SIGTERM"),
    }
    Ok(())
}

/// Waits for SIGINT or SIGTERM (Ctrl-C on non-Unix platforms)
///
/// # Errors
///
/// Returns [`crate::AppError::Io`] when the Ctrl-C handler cannot be
/// installed.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_starts_untriggered() {
        let (_trigger, signal) = channel();
        assert!(!signal.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let (trigger, mut signal) = channel();
        let waiter = tokio::spawn(async move {
            signal.triggered().await;
            signal.is_triggered()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.trigger();

        let seen = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert!(seen);
    }

    #[tokio::test]
    async fn test_trigger_before_wait_is_not_lost() {
        let (trigger, mut signal) = channel();
        trigger.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("already triggered signal must resolve immediately");
    }

    #[tokio::test]
    async fn test_subscribers_all_see_trigger() {
        let (trigger, first) = channel();
        let second = first.clone();
        let third = second.clone();
        trigger.trigger();
        trigger.trigger();
        assert!(first.is_triggered());
        assert!(second.is_triggered());
        assert!(third.is_triggered());
    }

    #[tokio::test]
    async fn test_dropped_trigger_counts_as_shutdown() {
        let (trigger, mut signal) = channel();
        drop(trigger);
        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("dropped trigger must release waiters");
    }
}
