// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack configuration
//!
//! Plain values, validated when the stack is declared. Defaults describe the
//! `mtls-test.kdnakt.com` deployment; environment variables and a JSON file
//! can override any of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constructs::SslPolicy;
use crate::domain::CaBundle;
use crate::errors::{SynthError, SynthResult};

/// Prefix of every environment variable read by [`StackConfig::from_env`]
pub const ENV_PREFIX: &str = "ALB_MTLS_";

/// Parameters of the mTLS load balancer stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// CloudFormation stack name
    pub stack_name: String,

    /// Existing public hosted zone
    pub zone_name: String,
    pub hosted_zone_id: String,

    /// Label under the zone for the certificate and alias record
    pub subdomain: String,

    pub vpc_cidr: String,
    pub max_azs: u8,
    pub subnet_mask: u8,

    /// Account allowed to write objects (connection logs) into the bucket
    pub log_writer_account: String,

    /// Local PEM file with the client CA certificates
    pub ca_bundle_path: PathBuf,

    /// Object key of the bundle in the trust store bucket
    pub ca_bundle_key: String,

    pub trust_store_name: String,
    pub ssl_policy: SslPolicy,
    pub response_message: String,

    /// Target account; unknown when unset
    pub account: Option<String>,

    /// Target region; unknown when unset
    pub region: Option<String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_name: "AwsAlbMtlsStack".to_string(),
            zone_name: "kdnakt.com".to_string(),
            hosted_zone_id: "Z15H9R9Z4PZ27T".to_string(),
            subdomain: "mtls-test".to_string(),
            vpc_cidr: "10.10.10.0/24".to_string(),
            max_azs: 2,
            subnet_mask: 27,
            log_writer_account: "582318560864".to_string(),
            ca_bundle_path: PathBuf::from("root_cert.pem"),
            ca_bundle_key: "root_cert.pem".to_string(),
            trust_store_name: "trust-store".to_string(),
            ssl_policy: SslPolicy::RecommendedTls,
            response_message: "mTLS success!".to_string(),
            account: None,
            region: None,
        }
    }
}

impl StackConfig {
    /// Defaults overridden by `ALB_MTLS_*` environment variables
    pub fn from_env() -> SynthResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> SynthResult<Self> {
        let path = path.as_ref();
        debug!("Loading stack configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Apply overrides from a variable lookup, e.g. the process environment
    ///
    /// Keys are looked up with [`ENV_PREFIX`] prepended.
    pub fn with_overrides<F>(mut self, lookup: F) -> SynthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("STACK_NAME") {
            self.stack_name = value;
        }
        if let Some(value) = var("ZONE_NAME") {
            self.zone_name = value;
        }
        if let Some(value) = var("HOSTED_ZONE_ID") {
            self.hosted_zone_id = value;
        }
        if let Some(value) = var("SUBDOMAIN") {
            self.subdomain = value;
        }
        if let Some(value) = var("VPC_CIDR") {
            self.vpc_cidr = value;
        }
        if let Some(value) = var("MAX_AZS") {
            self.max_azs = parse_number("MAX_AZS", &value)?;
        }
        if let Some(value) = var("SUBNET_MASK") {
            self.subnet_mask = parse_number("SUBNET_MASK", &value)?;
        }
        if let Some(value) = var("LOG_WRITER_ACCOUNT") {
            self.log_writer_account = value;
        }
        if let Some(value) = var("CA_BUNDLE") {
            self.ca_bundle_path = PathBuf::from(value);
        }
        if let Some(value) = var("CA_BUNDLE_KEY") {
            self.ca_bundle_key = value;
        }
        if let Some(value) = var("TRUST_STORE_NAME") {
            self.trust_store_name = value;
        }
        if let Some(value) = var("SSL_POLICY") {
            self.ssl_policy = SslPolicy::from_name(&value).ok_or_else(|| {
                SynthError::Configuration(format!("{}SSL_POLICY: unknown policy {}", ENV_PREFIX, value))
            })?;
        }
        if let Some(value) = var("RESPONSE_MESSAGE") {
            self.response_message = value;
        }
        if let Some(value) = var("ACCOUNT") {
            self.account = Some(value);
        }
        if let Some(value) = var("REGION") {
            self.region = Some(value);
        }

        Ok(self)
    }

    /// Read and parse the CA bundle file
    pub fn load_ca_bundle(&self) -> SynthResult<CaBundle> {
        let pem = std::fs::read_to_string(&self.ca_bundle_path).map_err(|source| {
            SynthError::CaBundleRead {
                path: self.ca_bundle_path.clone(),
                source,
            }
        })?;
        Ok(CaBundle::parse(pem)?)
    }
}

fn parse_number(name: &str, value: &str) -> SynthResult<u8> {
    value.trim().parse().map_err(|_| {
        SynthError::Configuration(format!("{}{}: not a number: {}", ENV_PREFIX, name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StackConfig::default();
        assert_eq!(config.zone_name, "kdnakt.com");
        assert_eq!(config.hosted_zone_id, "Z15H9R9Z4PZ27T");
        assert_eq!(config.subdomain, "mtls-test");
        assert_eq!(config.vpc_cidr, "10.10.10.0/24");
        assert_eq!(config.ssl_policy, SslPolicy::RecommendedTls);
        assert!(config.account.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StackConfig::default()
            .with_overrides(lookup(&[
                ("ALB_MTLS_SUBDOMAIN", "api"),
                ("ALB_MTLS_MAX_AZS", "3"),
                ("ALB_MTLS_SSL_POLICY", "ELBSecurityPolicy-TLS13-1-2-Res-2021-06"),
                ("ALB_MTLS_REGION", "ap-northeast-1"),
            ]))
            .unwrap();

        assert_eq!(config.subdomain, "api");
        assert_eq!(config.max_azs, 3);
        assert_eq!(config.ssl_policy, SslPolicy::Tls13Res);
        assert_eq!(config.region.as_deref(), Some("ap-northeast-1"));
        assert_eq!(config.zone_name, "kdnakt.com");
    }

    #[test]
    fn test_bad_override() {
        let result = StackConfig::default().with_overrides(lookup(&[("ALB_MTLS_SUBNET_MASK", "twenty")]));
        assert!(matches!(result, Err(SynthError::Configuration(_))));

        let result = StackConfig::default().with_overrides(lookup(&[("ALB_MTLS_SSL_POLICY", "modern")]));
        assert!(matches!(result, Err(SynthError::Configuration(_))));
    }

    #[test]
    fn test_partial_json() {
        let config: StackConfig = serde_json::from_str(r#"{ "subdomain": "mtls-prod" }"#).unwrap();
        assert_eq!(config.subdomain, "mtls-prod");
        assert_eq!(config.trust_store_name, "trust-store");
    }

    #[test]
    fn test_missing_bundle() {
        let config = StackConfig {
            ca_bundle_path: PathBuf::from("does/not/exist.pem"),
            ..StackConfig::default()
        };
        assert!(matches!(config.load_ca_bundle(), Err(SynthError::CaBundleRead { .. })));
    }
}
