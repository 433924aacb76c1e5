// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Keepalive loop
//!
//! One background task that wakes up on a fixed interval and runs a single
//! increment transaction against the counter row. Ticks run inline in the
//! task, so two ticks never overlap. Failed ticks are logged and the next
//! one is simply the next scheduled tick.

mod store;
mod tick;


use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::KeepaliveSettings;
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

pub use store::{COUNTER_KEY, CounterStore, CounterTransaction, MySqlCounterStore, MySqlCounterTx};
pub use tick::{increment_counter, run_tick};

/// Starts the background keepalive loop
///
/// The first tick fires one full interval after start. The loop ends as soon
/// as `shutdown` fires, including in the middle of a tick: the in-flight
/// transaction is dropped rather than awaited.
pub fn start_keepalive_loop<S: CounterStore>(
    mut shutdown: ShutdownSignal,
    store: Arc<S>,
    settings: KeepaliveSettings,
) -> JoinHandle<()> {
    tracing::info!(
        "Starting keepalive loop every {}s (tick timeout {:?})",
        settings.interval.as_secs(),
        settings.tick_timeout
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + settings.interval, settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick_number: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    tracing::info!("Stopping keepalive loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            tick_number += 1;
            tracing::trace!("Keepalive tick #{}", tick_number);

            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    tracing::info!(
                        "Stopping keepalive loop, abandoning in-flight tick #{}",
                        tick_number
                    );
                    break;
                }
                outcome = run_tick(&*store, settings.tick_timeout) => {
                    log_outcome(outcome);
                }
            }
        }
    })
}

fn log_outcome(outcome: Result<i64>) {
    match outcome {
        Ok(value) => tracing::info!("Counter: {}", value),
        Err(e) => {
            tracing::warn!("Keepalive increment error: {}", e);
            tracing::trace!("Error details: {:?}", e);
        }
    }
}
