// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Trust anchors and named TLS policies
//!
//! A connection string selects its TLS behaviour with a `tls=<value>`
//! parameter. The value is either one of the built-in modes or the name of a
//! policy registered in a [`TlsRegistry`] at startup.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;

use crate::error::{AppError, Result};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Mode names a policy cannot be registered under
const RESERVED_POLICY_NAMES: [&str; 4] = ["true", "false", "skip-verify", "preferred"];

/// One or more CA certificates used to verify the server
#[derive(Clone)]
pub struct TrustAnchors {
    pem: Vec<u8>,
    count: usize,
}

impl std::fmt::Debug for TrustAnchors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustAnchors")
            .field("count", &self.count)
            .field("bytes", &self.pem.len())
            .finish()
    }
}

impl TrustAnchors {
    /// Reads a PEM bundle from disk
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Tls`] when the file cannot be read or holds no
    /// valid certificate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read(path)
            .map_err(|e| AppError::Tls(format!("failed to read {}: {}", path.display(), e)))?;
        let anchors = Self::from_pem(pem)
            .map_err(|e| AppError::Tls(format!("{}: {}", path.display(), tls_detail(e))))?;
        tracing::info!(
            "Loaded {} trust anchor(s) from {}",
            anchors.count,
            path.display()
        );
        Ok(anchors)
    }

    /// Validates an in-memory PEM bundle
    ///
    /// Every `CERTIFICATE` block must be terminated and decode to an X.509
    /// certificate usable as a trust anchor. Text outside the blocks is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Tls`] for malformed blocks or a bundle without any
    /// certificate.
    pub fn from_pem(pem: Vec<u8>) -> Result<Self> {
        let text = std::str::from_utf8(&pem)
            .map_err(|_| AppError::Tls("PEM data is not valid UTF-8".to_string()))?;

        let mut roots = RootCertStore::empty();
        let mut count = 0;
        let mut body: Option<String> = None;
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line == PEM_BEGIN {
                if body.is_some() {
                    return Err(AppError::Tls(format!(
                        "nested certificate block at line {}",
                        idx + 1
                    )));
                }
                body = Some(String::new());
            } else if line == PEM_END {
                let encoded = body.take().ok_or_else(|| {
                    AppError::Tls(format!("unexpected end marker at line {}", idx + 1))
                })?;
                count += 1;
                add_anchor(&mut roots, &encoded, count)?;
            } else if let Some(encoded) = body.as_mut() {
                encoded.push_str(line);
            }
        }

        if body.is_some() {
            return Err(AppError::Tls("unterminated certificate block".to_string()));
        }
        if count == 0 {
            return Err(AppError::Tls("no certificates found in PEM data".to_string()));
        }

        tracing::trace!("Parsed {} trust anchor(s)", roots.len());
        Ok(Self { pem, count })
    }

    /// Number of certificates in the bundle
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Raw PEM bytes, as handed to the driver
    #[must_use]
    pub fn pem(&self) -> &[u8] {
        &self.pem
    }
}

fn add_anchor(roots: &mut RootCertStore, encoded: &str, index: usize) -> Result<()> {
    let der = STANDARD
        .decode(encoded)
        .map_err(|e| AppError::Tls(format!("certificate {index}: invalid base64: {e}")))?;
    roots
        .add(CertificateDer::from(der))
        .map_err(|e| AppError::Tls(format!("certificate {index}: not a valid certificate: {e}")))
}

/// Unwraps a TLS message so path prefixes do not repeat the variant text
fn tls_detail(err: AppError) -> String {
    match err {
        AppError::Tls(msg) => msg,
        other => other.to_string(),
    }
}

/// Server verification against a private set of trust anchors.
///
/// No client certificate is presented.
#[derive(Debug, Clone)]
pub struct TlsPolicy {
    trust_anchors: TrustAnchors,
}

impl TlsPolicy {
    pub fn new(trust_anchors: TrustAnchors) -> Self {
        Self { trust_anchors }
    }

    pub fn trust_anchors(&self) -> &TrustAnchors {
        &self.trust_anchors
    }
}

/// Named TLS policies, built once at startup and consulted when the
/// connection options are derived from the connection string.
#[derive(Debug, Clone, Default)]
pub struct TlsRegistry {
    policies: HashMap<String, TlsPolicy>,
}

impl TlsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `policy` under `name`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Tls`] for an empty name or one of the built-in
    /// mode names.
    pub fn register(&mut self, name: &str, policy: TlsPolicy) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AppError::Tls("TLS policy name cannot be empty".to_string()));
        }
        if RESERVED_POLICY_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
            return Err(AppError::Tls(format!(
                "TLS policy name '{name}' is reserved"
            )));
        }
        if self.policies.insert(name.to_string(), policy).is_some() {
            tracing::debug!("Replaced TLS policy '{}'", name);
        } else {
            tracing::debug!("Registered TLS policy '{}'", name);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TlsPolicy> {
        self.policies.get(name)
    }
}

/// TLS behaviour requested by the `tls` connection string parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// `tls=false`
    Disabled,
    /// `tls=preferred`
    Preferred,
    /// `tls=skip-verify`: encrypted, certificate not checked
    SkipVerify,
    /// `tls=true`: verified against the system roots
    SystemRoots,
    /// Verified against a registered policy
    Policy(String),
}

impl TlsMode {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" => TlsMode::SystemRoots,
            "false" | "0" => TlsMode::Disabled,
            "skip-verify" => TlsMode::SkipVerify,
            "preferred" => TlsMode::Preferred,
            _ => TlsMode::Policy(value.to_string()),
        }
    }
}
