// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS Account Identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::invariants::ValidationError;

/// Twelve-digit AWS account identifier
///
/// Used as a policy principal, e.g. the regional Elastic Load Balancing
/// account that writes connection logs into the trust store bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub const LENGTH: usize = 12;

    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.len() != Self::LENGTH || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}
