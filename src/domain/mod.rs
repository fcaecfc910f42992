// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Domain Models
//!
//! Validated value objects for the parameters of the mTLS load balancer
//! stack, the resource type taxonomy, and the pure invariant checks the
//! constructs run before adding resources to a template.
//!
//! # Value Objects with Invariants
//!
//! - [`DomainName`] - RFC 1123 DNS names (zone, certificate, alias record)
//! - [`HostedZoneId`] - Route 53 hosted zone identifier
//! - [`AccountId`] - 12-digit AWS account identifier
//! - [`Ipv4Cidr`] - IPv4 network block in CIDR notation
//! - [`SubnetMask`] - VPC subnet prefix length (/16-/28)
//! - [`CaBundle`] - PEM bundle of client CA certificates
//! - [`ApplicationProtocol`] / [`MutualAuthenticationMode`] - listener TLS settings
//! - [`ResourceType`] - CloudFormation resource type taxonomy

pub mod account;
pub mod ca_bundle;
pub mod domain_name;
pub mod invariants;
pub mod listener;
pub mod network;
pub mod resource_type;

pub use account::AccountId;
pub use ca_bundle::CaBundle;
pub use domain_name::{DomainName, DomainNameError, HostedZoneId};
pub use invariants::{ValidationError, ValidationResult};
pub use listener::{ApplicationProtocol, MutualAuthenticationMode};
pub use network::{Ipv4Cidr, NetworkError, SubnetMask};
pub use resource_type::{ResourceCategory, ResourceType};
