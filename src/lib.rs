// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # DB Keepalive
//!
//! Background daemon that keeps a MySQL connection pool warm.
//!
//! Once a minute it runs one short READ COMMITTED transaction that increments
//! the `counter` row of the `keepalive` table and logs the new value. The
//! pool talks TLS, verified against a trust anchor bundle loaded at startup.
//!
//! ## Main modules
//! - `config`: configuration management
//! - `db`: TLS policies, connect options and the connection pool
//! - `error`: error types
//! - `keepalive`: the increment transaction and the background loop
//! - `shutdown`: cancellation signal and OS signal handling
//! - `prelude`: commonly used types and traits

mod config;
mod db;
mod error;
mod keepalive;
pub mod prelude;
pub mod shutdown;

// Re-export commonly used types
/// Application configuration
pub use config::{Config, KeepaliveSettings, PoolSettings, defaults, env_vars, redact_dsn};

/// Application error and result type
pub use error::{AppError, Result};

/// TLS policies and the connection pool
pub use db::{
    TlsMode, TlsPolicy, TlsRegistry, TrustAnchors, build_pool, close_pool, connect_options,
};

/// Keepalive loop and the counter transaction
pub use keepalive::{
    COUNTER_KEY, CounterStore, CounterTransaction, MySqlCounterStore, MySqlCounterTx,
    increment_counter, run_tick, start_keepalive_loop,
};
