// Copyright (c) 2025 - Cowboy AI, Inc.
//! DNS Name Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Domain name is empty")]
    Empty,

    #[error("Domain name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Domain name contains an empty label: {0}")]
    EmptyLabel(String),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in domain name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericTopLevel(String),

    #[error("Wildcard is only allowed as the leftmost label: {0}")]
    MisplacedWildcard(String),

    #[error("Invalid hosted zone id: {0}")]
    InvalidHostedZoneId(String),
}

/// Fully qualified domain name value object
///
/// Represents a DNS name following RFC 1123 with invariants:
/// - Total length ≤ 253 characters (trailing root dot excluded)
/// - Each label 1-63 characters of ASCII alphanumerics and hyphens
/// - Labels cannot start or end with hyphens
/// - The top-level label cannot be all numeric
/// - `*` may appear only as the whole leftmost label
/// - Stored lowercase, without the trailing root dot
///
/// # Examples
///
/// ```rust
/// use alb_mtls::domain::DomainName;
///
/// let zone = DomainName::new("kdnakt.com").unwrap();
/// let host = zone.subdomain("mtls-test").unwrap();
/// assert_eq!(host.as_str(), "mtls-test.kdnakt.com");
/// assert_eq!(host.to_absolute(), "mtls-test.kdnakt.com.");
///
/// assert!(DomainName::new("").is_err());
/// assert!(DomainName::new("-invalid.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Maximum total length (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length of a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new domain name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, DomainNameError> {
        let name = name.into();
        let name = name.strip_suffix('.').unwrap_or(&name).to_ascii_lowercase();

        if name.is_empty() {
            return Err(DomainNameError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(DomainNameError::TooLong(name.len()));
        }

        let labels: Vec<&str> = name.split('.').collect();
        for (i, label) in labels.iter().enumerate() {
            if *label == "*" {
                if i != 0 {
                    return Err(DomainNameError::MisplacedWildcard(name.clone()));
                }
                continue;
            }
            Self::validate_label(label, &name)?;
        }

        if let Some(tld) = labels.last() {
            if labels.len() > 1 && tld.chars().all(|c| c.is_ascii_digit()) {
                return Err(DomainNameError::NumericTopLevel((*tld).to_string()));
            }
        }

        Ok(Self(name))
    }

    fn validate_label(label: &str, name: &str) -> Result<(), DomainNameError> {
        if label.is_empty() {
            return Err(DomainNameError::EmptyLabel(name.to_string()));
        }

        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(DomainNameError::LabelTooLong(label.to_string()));
        }

        if let Some(ch) = label
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '-')
        {
            return Err(DomainNameError::InvalidCharacter(ch));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainNameError::InvalidLabelFormat(label.to_string()));
        }

        Ok(())
    }

    /// Prepend a label, producing a name one level below this one
    pub fn subdomain(&self, label: &str) -> Result<Self, DomainNameError> {
        Self::new(format!("{}.{}", label, self.0))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute form with the trailing root dot, as Route 53 stores record names
    pub fn to_absolute(&self) -> String {
        format!("{}.", self.0)
    }

    /// Get the labels, leftmost first
    pub fn labels(&self) -> Vec<&str> {
        self.0.split('.').collect()
    }

    /// Get the parent name (everything after the first label)
    pub fn parent(&self) -> Option<DomainName> {
        self.0
            .split_once('.')
            .map(|(_, parent)| DomainName(parent.to_string()))
    }

    /// Whether this name equals `zone` or sits somewhere below it
    pub fn is_within(&self, zone: &DomainName) -> bool {
        self.0 == zone.0 || self.0.ends_with(&format!(".{}", zone.0))
    }

    /// Whether the leftmost label is a wildcard
    pub fn is_wildcard(&self) -> bool {
        self.0.starts_with("*.")
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}

/// Route 53 hosted zone identifier
///
/// Provider-assigned, uppercase alphanumeric, always starting with `Z`.
/// A `/hostedzone/` prefix as returned by the Route 53 API is stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostedZoneId(String);

impl HostedZoneId {
    /// Maximum length accepted by Route 53
    pub const MAX_LENGTH: usize = 32;

    pub fn new(id: impl Into<String>) -> Result<Self, DomainNameError> {
        let id = id.into();
        let id = id.strip_prefix("/hostedzone/").unwrap_or(&id).to_string();

        let valid = id.starts_with('Z')
            && id.len() <= Self::MAX_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if !valid {
            return Err(DomainNameError::InvalidHostedZoneId(id));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostedZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for HostedZoneId {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HostedZoneId> for String {
    fn from(value: HostedZoneId) -> Self {
        value.0
    }
}
