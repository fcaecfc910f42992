// Copyright (c) 2025 - Cowboy AI, Inc.
//! CloudFormation Resource Type Taxonomy
//!
//! The resource types this stack can declare, with their CloudFormation type
//! names and a coarse category used for logging and dependency summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CloudFormation resource types emitted by the constructs in this crate
///
/// Serializes as the CloudFormation type name, e.g. `AWS::S3::Bucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ResourceType {
    // DNS and certificates
    /// ACM certificate
    Certificate,
    /// Route 53 record set
    RecordSet,

    // Storage
    /// S3 bucket
    Bucket,
    /// S3 bucket resource policy
    BucketPolicy,
    /// Custom resource that copies objects into a bucket
    BucketDeployment,

    // Identity and compute
    /// IAM role
    Role,
    /// IAM inline policy
    Policy,
    /// Lambda function
    Function,

    // Network
    /// Virtual private cloud
    Vpc,
    /// VPC subnet
    Subnet,
    /// Subnet route table
    RouteTable,
    /// Subnet to route table association
    SubnetRouteTableAssociation,
    /// Route table entry
    Route,
    /// Internet gateway
    InternetGateway,
    /// Internet gateway to VPC attachment
    VpcGatewayAttachment,
    /// Security group
    SecurityGroup,

    // Load balancing
    /// Application load balancer
    LoadBalancer,
    /// Load balancer listener
    Listener,
    /// Client CA trust store
    TrustStore,
}

/// Coarse grouping of resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Dns,
    Storage,
    Identity,
    Compute,
    Network,
    LoadBalancing,
}

impl ResourceType {
    /// Every type, in declaration order
    pub const ALL: [ResourceType; 19] = [
        Self::Certificate,
        Self::RecordSet,
        Self::Bucket,
        Self::BucketPolicy,
        Self::BucketDeployment,
        Self::Role,
        Self::Policy,
        Self::Function,
        Self::Vpc,
        Self::Subnet,
        Self::RouteTable,
        Self::SubnetRouteTableAssociation,
        Self::Route,
        Self::InternetGateway,
        Self::VpcGatewayAttachment,
        Self::SecurityGroup,
        Self::LoadBalancer,
        Self::Listener,
        Self::TrustStore,
    ];

    /// CloudFormation type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "AWS::CertificateManager::Certificate",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Bucket => "AWS::S3::Bucket",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
            Self::BucketDeployment => "Custom::CDKBucketDeployment",
            Self::Role => "AWS::IAM::Role",
            Self::Policy => "AWS::IAM::Policy",
            Self::Function => "AWS::Lambda::Function",
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::Route => "AWS::EC2::Route",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::Listener => "AWS::ElasticLoadBalancingV2::Listener",
            Self::TrustStore => "AWS::ElasticLoadBalancingV2::TrustStore",
        }
    }

    /// Parse a CloudFormation type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Certificate | Self::RecordSet => ResourceCategory::Dns,
            Self::Bucket | Self::BucketPolicy | Self::BucketDeployment => {
                ResourceCategory::Storage
            }
            Self::Role | Self::Policy => ResourceCategory::Identity,
            Self::Function => ResourceCategory::Compute,
            Self::Vpc
            | Self::Subnet
            | Self::RouteTable
            | Self::SubnetRouteTableAssociation
            | Self::Route
            | Self::InternetGateway
            | Self::VpcGatewayAttachment
            | Self::SecurityGroup => ResourceCategory::Network,
            Self::LoadBalancer | Self::Listener | Self::TrustStore => {
                ResourceCategory::LoadBalancing
            }
        }
    }

    /// Whether this is a custom resource backed by a Lambda handler
    pub fn is_custom(&self) -> bool {
        self.as_str().starts_with("Custom::")
    }
}

impl From<ResourceType> for &'static str {
    fn from(value: ResourceType) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for ResourceType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_type_name(&value).ok_or_else(|| format!("unknown resource type: {}", value))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
