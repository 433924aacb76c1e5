// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for the keepalive daemon

use std::time::Duration;

use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (signal handlers, filesystem)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Trust anchor loading or TLS policy error
    #[error("TLS error: {0}")]
    Tls(String),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The counter row the keepalive increments does not exist
    #[error("Counter row '{0}' not found")]
    CounterMissing(String),

    /// Operation did not finish within its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;
