// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! A single keepalive tick: increment the counter and read it back

use std::time::Duration;

use super::store::{CounterStore, CounterTransaction};
use crate::error::{AppError, Result};

/// Runs the increment transaction and returns the committed value.
///
/// A failed update or read rolls the transaction back. A failed commit is
/// returned as is: the outcome on the server is unknown, so there is
/// nothing sensible to roll back.
///
/// # Errors
///
/// Returns the first error raised by the store.
pub async fn increment_counter<S: CounterStore>(store: &S) -> Result<i64> {
    let mut tx = store.begin().await?;

    if let Err(e) = tx.increment().await {
        rollback(tx).await;
        return Err(e);
    }

    let value = match tx.current_value().await {
        Ok(value) => value,
        Err(e) => {
            rollback(tx).await;
            return Err(e);
        }
    };

    tx.commit().await?;
    Ok(value)
}

/// [`increment_counter`] bounded by `deadline`.
///
/// When the deadline passes the transaction is dropped; the driver rolls it
/// back once its connection returns to the pool.
///
/// # Errors
///
/// Returns [`AppError::Timeout`] when the deadline passes, otherwise the
/// error from [`increment_counter`].
pub async fn run_tick<S: CounterStore>(store: &S, deadline: Duration) -> Result<i64> {
    tokio::time::timeout(deadline, increment_counter(store))
        .await
        .map_err(|_| AppError::Timeout(deadline))?
}

async fn rollback<T: CounterTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        tracing::debug!("Rollback failed: {}", e);
    }
}
