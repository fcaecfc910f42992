// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Address has host bits set for its prefix: {0}")]
    HostBitsSet(String),

    #[error("Invalid subnet mask: /{0} (must be /16 to /28)")]
    InvalidSubnetMask(u8),

    #[error("Cannot carve {requested} /{prefix} subnets out of {block}")]
    InsufficientAddressSpace {
        block: String,
        prefix: u8,
        requested: usize,
    },
}

/// IPv4 network block in CIDR notation
///
/// Invariants:
/// - Valid IPv4 address with an explicit prefix length 0-32
/// - The address is the network address (no host bits set)
///
/// # Examples
///
/// ```rust
/// use alb_mtls::domain::Ipv4Cidr;
///
/// let block = Ipv4Cidr::new("10.10.10.0/24").unwrap();
/// let subnets = block.carve(27, 2).unwrap();
/// assert_eq!(subnets[1].to_string(), "10.10.10.32/27");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from a network address and prefix length
    pub fn from_parts(network: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        if u32::from(network) & !Self::mask(prefix_length) != 0 {
            return Err(NetworkError::HostBitsSet(format!(
                "{}/{}",
                network, prefix_length
            )));
        }

        Ok(Self {
            network,
            prefix_length,
        })
    }

    fn mask(prefix_length: u8) -> u32 {
        if prefix_length == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_length))
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_length))
    }

    /// Last address of the block
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !Self::mask(self.prefix_length))
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & Self::mask(self.prefix_length) == u32::from(self.network)
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains_block(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_length >= self.prefix_length && self.contains(other.network)
    }

    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.contains_block(other) || other.contains_block(self)
    }

    /// Carve `count` consecutive subnets of `prefix_length` from the start of the block
    pub fn carve(&self, prefix_length: u8, count: usize) -> Result<Vec<Ipv4Cidr>, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        let insufficient = || NetworkError::InsufficientAddressSpace {
            block: self.to_string(),
            prefix: prefix_length,
            requested: count,
        };

        if prefix_length < self.prefix_length {
            return Err(insufficient());
        }

        let available = 1u64 << (prefix_length - self.prefix_length);
        if count as u64 > available {
            return Err(insufficient());
        }

        let step = 1u64 << (32 - u32::from(prefix_length));
        (0..count as u64)
            .map(|i| {
                let start = u64::from(u32::from(self.network)) + i * step;
                Self::from_parts(Ipv4Addr::from(start as u32), prefix_length)
            })
            .collect()
    }

    /// Allocate subnets for `prefix_lengths` in order, each aligned to its own size
    ///
    /// Allocation starts at the network address and never reuses space, so
    /// the returned blocks are disjoint and all lie inside this block.
    pub fn allocate(&self, prefix_lengths: &[u8]) -> Result<Vec<Ipv4Cidr>, NetworkError> {
        let end = u64::from(u32::from(self.network)) + self.size();
        let mut cursor = u64::from(u32::from(self.network));
        let mut subnets = Vec::with_capacity(prefix_lengths.len());

        for &prefix_length in prefix_lengths {
            if prefix_length > 32 {
                return Err(NetworkError::InvalidPrefixLength(prefix_length));
            }

            let size = 1u64 << (32 - u32::from(prefix_length));
            let start = cursor.div_ceil(size) * size;
            if prefix_length < self.prefix_length || start + size > end {
                return Err(NetworkError::InsufficientAddressSpace {
                    block: self.to_string(),
                    prefix: prefix_length,
                    requested: prefix_lengths.len(),
                });
            }

            subnets.push(Self::from_parts(Ipv4Addr::from(start as u32), prefix_length)?);
            cursor = start + size;
        }

        Ok(subnets)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_length)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ipv4Cidr> for String {
    fn from(value: Ipv4Cidr) -> Self {
        value.to_string()
    }
}

/// Subnet mask for VPC subnets
///
/// Invariants:
/// - Between /16 and /28, the range AWS accepts for VPC and subnet blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SubnetMask(u8);

impl SubnetMask {
    /// Largest subnet AWS allows
    pub const MIN: u8 = 16;

    /// Smallest subnet AWS allows
    pub const MAX: u8 = 28;

    pub fn new(prefix_length: u8) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&prefix_length) {
            return Err(NetworkError::InvalidSubnetMask(prefix_length));
        }

        Ok(Self(prefix_length))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SubnetMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl TryFrom<u8> for SubnetMask {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubnetMask> for u8 {
    fn from(value: SubnetMask) -> Self {
        value.0
    }
}
