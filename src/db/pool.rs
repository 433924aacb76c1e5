// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Bounded MySQL connection pool

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::config::PoolSettings;
use crate::error::{AppError, Result};

/// Applied to every new connection so each transaction runs READ COMMITTED
const READ_COMMITTED: &str = "SET SESSION TRANSACTION ISOLATION LEVEL READ COMMITTED";

/// Creates the pool without opening a connection.
///
/// The first connection is established by the first keepalive tick, so a
/// database that is briefly unreachable at startup only costs that tick.
/// Idle connections are never reaped by age: the idle bound is always at
/// most the open bound, so every open connection may stay warm until
/// `max_connection_lifetime` recycles it.
pub fn build_pool(settings: &PoolSettings, options: MySqlConnectOptions) -> MySqlPool {
    let max_idle = settings.effective_max_idle();
    if max_idle < settings.max_idle_connections {
        tracing::debug!(
            "max_idle_connections {} exceeds max_open_connections, clamped to {}",
            settings.max_idle_connections,
            max_idle
        );
    }
    tracing::info!(
        "Creating connection pool: max_open={}, max_idle={}, max_lifetime={:?}",
        settings.max_open_connections,
        max_idle,
        settings.max_connection_lifetime
    );

    MySqlPoolOptions::new()
        .max_connections(settings.max_open_connections)
        .min_connections(0)
        .max_lifetime(settings.max_connection_lifetime)
        .idle_timeout(None::<Duration>)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query(READ_COMMITTED).execute(&mut *conn).await?;
                tracing::trace!("New pooled connection set to READ COMMITTED");
                Ok(())
            })
        })
        .connect_lazy_with(options)
}

/// Closes the pool, giving up after `timeout`.
///
/// Closing waits for checked-out connections to come back, so an abandoned
/// keepalive tick can hold it up until its connection is released.
///
/// # Errors
///
/// Returns [`AppError::Timeout`] when the pool did not close in time.
pub async fn close_pool(pool: &MySqlPool, timeout: Duration) -> Result<()> {
    tracing::debug!(
        "Closing connection pool ({} open, {} idle)",
        pool.size(),
        pool.num_idle()
    );
    tokio::time::timeout(timeout, pool.close())
        .await
        .map_err(|_| AppError::Timeout(timeout))
}
