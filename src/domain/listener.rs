// Copyright (c) 2025 - Cowboy AI, Inc.
//! Listener Protocol Settings
//!
//! The protocol a listener speaks and how it treats client certificates.
//! Both are checked by the listener invariants and rendered by the load
//! balancing constructs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Listener protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

impl ApplicationProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for ApplicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a listener treats client certificates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutualAuthenticationMode {
    /// Client certificates are ignored
    Off,
    /// The certificate chain is forwarded to targets unverified
    Passthrough,
    /// The chain is verified against a trust store
    Verify,
}

impl MutualAuthenticationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Passthrough => "passthrough",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for MutualAuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
