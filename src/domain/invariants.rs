// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Resource Invariants
//!
//! Business rules the load balancing and DNS APIs would reject at apply time,
//! checked while the stack is declared so a bad declaration fails before any
//! template is written.
//!
//! All functions are pure (no side effects) and return detailed validation
//! results.

use crate::domain::{ApplicationProtocol, DomainName, Ipv4Cidr, MutualAuthenticationMode};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid AWS account id: {0} (must be 12 digits)")]
    InvalidAccountId(String),

    #[error("Invalid logical id: {0}")]
    InvalidLogicalId(String),

    #[error("Invalid listener port: {0}")]
    InvalidPort(u16),

    #[error("{protocol} listener requires at least one certificate")]
    CertificateRequired { protocol: ApplicationProtocol },

    #[error("{protocol} listener cannot carry certificates or a TLS policy")]
    UnexpectedTlsSettings { protocol: ApplicationProtocol },

    #[error("Mutual authentication requires an HTTPS listener")]
    MutualAuthenticationRequiresHttps,

    #[error("Mutual authentication mode {0} requires a trust store")]
    TrustStoreRequired(MutualAuthenticationMode),

    #[error("Mutual authentication mode {0} does not accept a trust store")]
    UnexpectedTrustStore(MutualAuthenticationMode),

    #[error("Invalid fixed response status code: {0} (must be 200-599)")]
    InvalidStatusCode(u16),

    #[error("Unsupported fixed response content type: {0}")]
    UnsupportedContentType(String),

    #[error("Fixed response message body is {0} characters (maximum 1024)")]
    MessageBodyTooLong(usize),

    #[error("Invalid trust store name: {0}")]
    InvalidTrustStoreName(String),

    #[error("Invalid CA bundle: {0}")]
    InvalidCaBundle(String),

    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),

    #[error("Record {record} is not inside hosted zone {zone}")]
    RecordOutsideZone { record: String, zone: String },

    #[error("VPC block {0} must have a prefix between /16 and /28")]
    InvalidVpcCidr(String),

    #[error("Invalid availability zone count: {0} (must be 1-6)")]
    InvalidMaxAzs(u8),

    #[error("Subnet mask /{mask} is larger than VPC block {block}")]
    SubnetLargerThanVpc { mask: u8, block: String },
}

/// Content types an ALB fixed-response action accepts
pub const FIXED_RESPONSE_CONTENT_TYPES: &[&str] = &[
    "text/plain",
    "text/css",
    "text/html",
    "application/javascript",
    "application/json",
];

/// Maximum fixed-response message body length
pub const FIXED_RESPONSE_MAX_BODY: usize = 1024;

/// Maximum trust store name length
pub const TRUST_STORE_NAME_MAX: usize = 32;

/// Maximum CloudFormation logical id length
pub const LOGICAL_ID_MAX: usize = 255;

/// Validate a CloudFormation logical id
///
/// # Rules
/// - Non-empty, at most 255 characters
/// - ASCII alphanumerics only
pub fn validate_logical_id(id: &str) -> ValidationResult {
    if id.is_empty()
        || id.len() > LOGICAL_ID_MAX
        || !id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidLogicalId(id.to_string()));
    }
    Ok(())
}

pub fn validate_port(port: u16) -> ValidationResult {
    if port == 0 {
        return Err(ValidationError::InvalidPort(port));
    }
    Ok(())
}

/// Validate the TLS settings of a listener against its protocol
///
/// # Rules
/// - HTTPS needs at least one certificate
/// - HTTP carries neither certificates nor a TLS policy
pub fn validate_listener_tls(
    protocol: ApplicationProtocol,
    certificate_count: usize,
    has_ssl_policy: bool,
) -> ValidationResult {
    match protocol {
        ApplicationProtocol::Https if certificate_count == 0 => {
            Err(ValidationError::CertificateRequired { protocol })
        }
        ApplicationProtocol::Http if certificate_count > 0 || has_ssl_policy => {
            Err(ValidationError::UnexpectedTlsSettings { protocol })
        }
        _ => Ok(()),
    }
}

/// Validate a mutual authentication block
///
/// # Rules
/// - Only HTTPS listeners authenticate clients
/// - `verify` needs a trust store, `off` and `passthrough` must not have one
pub fn validate_mutual_authentication(
    protocol: ApplicationProtocol,
    mode: MutualAuthenticationMode,
    has_trust_store: bool,
) -> ValidationResult {
    if protocol != ApplicationProtocol::Https {
        return Err(ValidationError::MutualAuthenticationRequiresHttps);
    }

    match (mode, has_trust_store) {
        (MutualAuthenticationMode::Verify, false) => {
            Err(ValidationError::TrustStoreRequired(mode))
        }
        (MutualAuthenticationMode::Off | MutualAuthenticationMode::Passthrough, true) => {
            Err(ValidationError::UnexpectedTrustStore(mode))
        }
        _ => Ok(()),
    }
}

/// Validate a fixed-response action
///
/// # Rules
/// - Status code 200-599
/// - Content type from the ALB allow-list
/// - Body at most 1024 characters
pub fn validate_fixed_response(
    status_code: u16,
    content_type: Option<&str>,
    message_body: Option<&str>,
) -> ValidationResult {
    if !(200..=599).contains(&status_code) {
        return Err(ValidationError::InvalidStatusCode(status_code));
    }

    if let Some(content_type) = content_type {
        if !FIXED_RESPONSE_CONTENT_TYPES.contains(&content_type) {
            return Err(ValidationError::UnsupportedContentType(
                content_type.to_string(),
            ));
        }
    }

    if let Some(body) = message_body {
        let len = body.chars().count();
        if len > FIXED_RESPONSE_MAX_BODY {
            return Err(ValidationError::MessageBodyTooLong(len));
        }
    }

    Ok(())
}

/// Validate a trust store name
///
/// # Rules
/// - 1-32 characters
/// - ASCII alphanumerics and hyphens, not starting or ending with a hyphen
pub fn validate_trust_store_name(name: &str) -> ValidationResult {
    let valid = !name.is_empty()
        && name.len() <= TRUST_STORE_NAME_MAX
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');

    if !valid {
        return Err(ValidationError::InvalidTrustStoreName(name.to_string()));
    }
    Ok(())
}

/// Validate an S3 object key used for the CA bundle
pub fn validate_object_key(key: &str) -> ValidationResult {
    if key.is_empty() || key.len() > 1024 || key.starts_with('/') {
        return Err(ValidationError::InvalidObjectKey(key.to_string()));
    }
    Ok(())
}

/// Validate an alias record lives inside its hosted zone
pub fn validate_record_in_zone(record: &DomainName, zone: &DomainName) -> ValidationResult {
    if !record.is_within(zone) {
        return Err(ValidationError::RecordOutsideZone {
            record: record.to_string(),
            zone: zone.to_string(),
        });
    }
    Ok(())
}

/// Validate the VPC layout before subnets are carved
///
/// # Rules
/// - VPC block prefix /16-/28
/// - 1-6 availability zones
/// - Subnet mask not larger than the VPC block
pub fn validate_vpc_layout(block: &Ipv4Cidr, max_azs: u8, subnet_mask: u8) -> ValidationResult {
    if !(16..=28).contains(&block.prefix_length()) {
        return Err(ValidationError::InvalidVpcCidr(block.to_string()));
    }

    if !(1..=6).contains(&max_azs) {
        return Err(ValidationError::InvalidMaxAzs(max_azs));
    }

    if subnet_mask < block.prefix_length() {
        return Err(ValidationError::SubnetLargerThanVpc {
            mask: subnet_mask,
            block: block.to_string(),
        });
    }

    Ok(())
}
