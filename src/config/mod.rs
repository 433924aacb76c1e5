// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the keepalive daemon
//!
//! The only runtime input is the connection string; everything else is a
//! fixed default kept in [`defaults`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};


/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Trust anchor bundle, relative to the working directory
    pub const CA_CERT_PATH: &str = "ca.pem";
    /// Name under which the trust anchors are registered as a TLS policy
    pub const TLS_POLICY_NAME: &str = "custom";

    pub const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(3 * 60);
    pub const MAX_OPEN_CONNECTIONS: u32 = 10;
    pub const MAX_IDLE_CONNECTIONS: u32 = 10;
    pub const POOL_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

    pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
    pub const TICK_TIMEOUT: Duration = Duration::from_secs(3);
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const DATA_SOURCE_NAME: &str = "DATA_SOURCE_NAME";
}

/// Connection pool bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connection_lifetime: Duration,
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    /// Upper bound on how long shutdown waits for the pool to close
    pub close_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connection_lifetime: defaults::MAX_CONNECTION_LIFETIME,
            max_open_connections: defaults::MAX_OPEN_CONNECTIONS,
            max_idle_connections: defaults::MAX_IDLE_CONNECTIONS,
            close_timeout: defaults::POOL_CLOSE_TIMEOUT,
        }
    }
}

impl PoolSettings {
    /// Idle connections can never outnumber open ones
    #[must_use]
    pub fn effective_max_idle(&self) -> u32 {
        self.max_idle_connections.min(self.max_open_connections)
    }
}

/// Keepalive loop timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepaliveSettings {
    /// Time between two ticks
    pub interval: Duration,
    /// Deadline for a single increment transaction
    pub tick_timeout: Duration,
}

impl Default for KeepaliveSettings {
    fn default() -> Self {
        Self {
            interval: defaults::KEEPALIVE_INTERVAL,
            tick_timeout: defaults::TICK_TIMEOUT,
        }
    }
}

/// Application-wide configuration
#[derive(Clone)]
pub struct Config {
    pub data_source_name: String,
    pub ca_cert_path: PathBuf,
    pub tls_policy_name: String,
    pub pool: PoolSettings,
    pub keepalive: KeepaliveSettings,
}

impl Config {
    /// Builds a configuration around the given connection string, with every
    /// other setting at its default.
    pub fn new(data_source_name: impl Into<String>) -> Self {
        Config {
            data_source_name: data_source_name.into(),
            ca_cert_path: PathBuf::from(defaults::CA_CERT_PATH),
            tls_policy_name: defaults::TLS_POLICY_NAME.to_string(),
            pool: PoolSettings::default(),
            keepalive: KeepaliveSettings::default(),
        }
    }

    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when `DATA_SOURCE_NAME` is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when `DATA_SOURCE_NAME` is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_source_name = lookup(env_vars::DATA_SOURCE_NAME)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(format!("{} not set", env_vars::DATA_SOURCE_NAME))
            })?;

        let config = Config::new(data_source_name);
        tracing::debug!(
            "Loaded configuration: dsn={}, ca={}",
            config.redacted_dsn(),
            config.ca_cert_path.display()
        );
        Ok(config)
    }

    /// Connection string with the password masked, safe for logs
    #[must_use]
    pub fn redacted_dsn(&self) -> String {
        redact_dsn(&self.data_source_name)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_source_name", &self.redacted_dsn())
            .field("ca_cert_path", &self.ca_cert_path)
            .field("tls_policy_name", &self.tls_policy_name)
            .field("pool", &self.pool)
            .field("keepalive", &self.keepalive)
            .finish()
    }
}

/// Masks the password of a URL-style connection string.
///
/// Anything that is not a hierarchical URL is hidden entirely, since there
/// is no reliable way to tell where the secret sits.
pub fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        _ => "<unparseable connection string>".to_string(),
    }
}
