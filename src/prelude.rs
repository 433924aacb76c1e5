// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! ```rust
//! use db_keepalive::prelude::*;
//! ```

// Core types
pub use crate::config::{Config, KeepaliveSettings, PoolSettings};
pub use crate::error::{AppError, Result};

// Database
pub use crate::db::{TlsPolicy, TlsRegistry, TrustAnchors, build_pool, close_pool, connect_options};

// Keepalive
pub use crate::keepalive::{
    CounterStore, CounterTransaction, MySqlCounterStore, increment_counter, start_keepalive_loop,
};
pub use crate::shutdown::{ShutdownSignal, ShutdownTrigger};
