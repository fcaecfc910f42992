// Copyright (c) 2025 - Cowboy AI, Inc.
//! Elastic Load Balancing v2
//!
//! Application Load Balancer, its security group, listeners with fixed
//! responses, and the trust store plus mutual authentication block used for
//! client certificate verification.
//!
//! # Mutual TLS
//!
//! A listener in `verify` mode rejects clients whose certificate does not
//! chain to a CA in the trust store. The trust store reads its CA bundle
//! from S3 when it is created, so the bundle object has to exist first.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, info};

use super::ec2::{Subnet, SubnetType, Vpc};
use crate::domain::invariants::{
    validate_fixed_response, validate_listener_tls, validate_mutual_authentication,
    validate_object_key, validate_port, validate_trust_store_name,
};
use crate::domain::ResourceType;
pub use crate::domain::{ApplicationProtocol, MutualAuthenticationMode};
use crate::errors::{SynthError, SynthResult};
use crate::stack::Stack;
use crate::template::intrinsic;

/// Predefined TLS security policies
///
/// Serialized as the policy name ELB expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum SslPolicy {
    /// TLS 1.3 and 1.2, the current recommendation
    RecommendedTls,
    /// The older default that still allows TLS 1.0
    Recommended,
    Tls13Res,
    Tls13Ext1,
    Tls13Ext2,
    Tls13Only,
    Tls12Ext,
    Tls12,
    ForwardSecrecyTls12Res,
}

impl SslPolicy {
    pub const ALL: [SslPolicy; 9] = [
        Self::RecommendedTls,
        Self::Recommended,
        Self::Tls13Res,
        Self::Tls13Ext1,
        Self::Tls13Ext2,
        Self::Tls13Only,
        Self::Tls12Ext,
        Self::Tls12,
        Self::ForwardSecrecyTls12Res,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecommendedTls => "ELBSecurityPolicy-TLS13-1-2-2021-06",
            Self::Recommended => "ELBSecurityPolicy-2016-08",
            Self::Tls13Res => "ELBSecurityPolicy-TLS13-1-2-Res-2021-06",
            Self::Tls13Ext1 => "ELBSecurityPolicy-TLS13-1-2-Ext1-2021-06",
            Self::Tls13Ext2 => "ELBSecurityPolicy-TLS13-1-2-Ext2-2021-06",
            Self::Tls13Only => "ELBSecurityPolicy-TLS13-1-3-2021-06",
            Self::Tls12Ext => "ELBSecurityPolicy-TLS-1-2-Ext-2018-06",
            Self::Tls12 => "ELBSecurityPolicy-TLS-1-2-2017-01",
            Self::ForwardSecrecyTls12Res => "ELBSecurityPolicy-FS-1-2-Res-2020-10",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.as_str() == name)
    }
}

impl fmt::Display for SslPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SslPolicy> for &'static str {
    fn from(value: SslPolicy) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for SslPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value).ok_or_else(|| format!("unknown SSL policy: {}", value))
    }
}

/// Props for [`TrustStore::new`]
#[derive(Debug, Clone)]
pub struct TrustStoreProps {
    pub name: String,
    /// Bucket holding the CA bundle, usually a reference
    pub bundle_bucket: Value,
    pub bundle_key: String,
}

/// A named set of CA certificates loaded from S3
#[derive(Debug, Clone)]
pub struct TrustStore {
    logical_id: String,
    name: String,
}

impl TrustStore {
    pub fn new(stack: &mut Stack, id: &str, props: TrustStoreProps) -> SynthResult<Self> {
        validate_trust_store_name(&props.name)?;
        validate_object_key(&props.bundle_key)?;

        let logical_id = stack.add_resource(
            &[id],
            ResourceType::TrustStore,
            json!({
                "CaCertificatesBundleS3Bucket": props.bundle_bucket,
                "CaCertificatesBundleS3Key": props.bundle_key,
                "Name": props.name,
            }),
        )?;

        debug!("Trust store {} reads s3 key {}", props.name, props.bundle_key);
        Ok(Self {
            logical_id,
            name: props.name,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Ref` on a trust store yields its ARN
    pub fn trust_store_arn(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationLoadBalancerProps {
    pub internet_facing: bool,
    /// Subnets of this type in the VPC host the load balancer
    pub subnet_type: SubnetType,
}

impl Default for ApplicationLoadBalancerProps {
    fn default() -> Self {
        Self {
            internet_facing: false,
            subnet_type: SubnetType::PrivateIsolated,
        }
    }
}

/// An Application Load Balancer with its own security group
#[derive(Debug, Clone)]
pub struct ApplicationLoadBalancer {
    id: String,
    logical_id: String,
    security_group_id: String,
}

impl ApplicationLoadBalancer {
    pub fn new(
        stack: &mut Stack,
        id: &str,
        vpc: &Vpc,
        props: ApplicationLoadBalancerProps,
    ) -> SynthResult<Self> {
        let subnets: Vec<&Subnet> = vpc
            .subnets()
            .iter()
            .filter(|subnet| subnet.subnet_type() == props.subnet_type)
            .collect();
        if subnets.is_empty() {
            return Err(SynthError::Configuration(format!(
                "load balancer {} has no {:?} subnets in {}",
                id,
                props.subnet_type,
                vpc.logical_id()
            )));
        }

        let description = format!(
            "Automatically created Security Group for ELB {}",
            Stack::logical_id(&[stack.name(), id])
        );
        let security_group_id = stack.add_resource(
            &[id, "SecurityGroup", "Resource"],
            ResourceType::SecurityGroup,
            json!({
                "GroupDescription": description,
                "SecurityGroupEgress": [{
                    "CidrIp": "0.0.0.0/0",
                    "Description": "Allow all outbound traffic by default",
                    "IpProtocol": "-1",
                }],
                "VpcId": vpc.vpc_id(),
            }),
        )?;

        let scheme = if props.internet_facing { "internet-facing" } else { "internal" };
        let logical_id = stack.add_resource(
            &[id, "Resource"],
            ResourceType::LoadBalancer,
            json!({
                "LoadBalancerAttributes": [{ "Key": "deletion_protection.enabled", "Value": "false" }],
                "Scheme": scheme,
                "SecurityGroups": [intrinsic::get_att(&security_group_id, "GroupId")],
                "Subnets": subnets.iter().map(|subnet| subnet.subnet_id()).collect::<Vec<_>>(),
                "Type": "application",
            }),
        )?;

        // Internet-facing load balancers fail to create before the route out exists
        if props.internet_facing {
            for subnet in &subnets {
                for dependency in subnet.internet_connectivity() {
                    stack.add_dependency(&logical_id, dependency)?;
                }
            }
        }

        info!(
            "Load balancer {} ({}) in {} subnet(s)",
            logical_id,
            scheme,
            subnets.len()
        );
        Ok(Self {
            id: id.to_string(),
            logical_id,
            security_group_id,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn security_group_id(&self) -> &str {
        &self.security_group_id
    }

    pub fn load_balancer_arn(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    pub fn dns_name(&self) -> Value {
        intrinsic::get_att(&self.logical_id, "DNSName")
    }

    pub fn canonical_hosted_zone_id(&self) -> Value {
        intrinsic::get_att(&self.logical_id, "CanonicalHostedZoneID")
    }

    /// Replace the load balancer attributes
    ///
    /// Values stay JSON so they can carry references, e.g. a log bucket name.
    pub fn set_attributes<K>(&self, stack: &mut Stack, attributes: Vec<(K, Value)>) -> SynthResult<()>
    where
        K: Into<String>,
    {
        let attributes: Vec<Value> = attributes
            .into_iter()
            .map(|(key, value)| json!({ "Key": key.into(), "Value": value }))
            .collect();
        stack.set_property(&self.logical_id, "LoadBalancerAttributes", Value::Array(attributes))
    }

    /// Allow inbound TCP from anywhere on `port`
    pub fn allow_from_anyone(&self, stack: &mut Stack, port: u16) -> SynthResult<()> {
        let rule = json!({
            "CidrIp": "0.0.0.0/0",
            "Description": format!("Allow from anyone on port {}", port),
            "FromPort": port,
            "IpProtocol": "tcp",
            "ToPort": port,
        });

        let group = stack.resource_mut(&self.security_group_id)?;
        let ingress = group
            .properties
            .entry("SecurityGroupIngress")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(rules) = ingress {
            rules.push(rule);
        }
        Ok(())
    }

    pub fn add_listener(&self, stack: &mut Stack, id: &str, props: ListenerProps) -> SynthResult<Listener> {
        validate_port(props.port)?;
        validate_listener_tls(props.protocol, props.certificates.len(), props.ssl_policy.is_some())?;
        props.default_action.validate()?;

        let mut properties = json!({
            "DefaultActions": [props.default_action.to_json()],
            "LoadBalancerArn": self.load_balancer_arn(),
            "Port": props.port,
            "Protocol": props.protocol.as_str(),
        });
        if !props.certificates.is_empty() {
            properties["Certificates"] = props
                .certificates
                .iter()
                .map(|arn| json!({ "CertificateArn": arn }))
                .collect();
        }
        if let Some(policy) = props.ssl_policy {
            properties["SslPolicy"] = json!(policy.as_str());
        }

        let logical_id = stack.add_resource(&[self.id.as_str(), id, "Resource"], ResourceType::Listener, properties)?;

        if props.open {
            self.allow_from_anyone(stack, props.port)?;
        }

        info!("Listener {} on {} {}", logical_id, props.protocol, props.port);
        Ok(Listener {
            logical_id,
            protocol: props.protocol,
        })
    }
}

/// What a listener does with a request no rule matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerAction {
    FixedResponse {
        status_code: u16,
        content_type: Option<String>,
        message_body: Option<String>,
    },
}

impl ListenerAction {
    pub fn fixed_response(status_code: u16) -> Self {
        Self::FixedResponse {
            status_code,
            content_type: None,
            message_body: None,
        }
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        let Self::FixedResponse { content_type, .. } = &mut self;
        *content_type = Some(value.into());
        self
    }

    pub fn with_message_body(mut self, value: impl Into<String>) -> Self {
        let Self::FixedResponse { message_body, .. } = &mut self;
        *message_body = Some(value.into());
        self
    }

    fn validate(&self) -> SynthResult<()> {
        let Self::FixedResponse {
            status_code,
            content_type,
            message_body,
        } = self;
        validate_fixed_response(*status_code, content_type.as_deref(), message_body.as_deref())?;
        Ok(())
    }

    fn to_json(&self) -> Value {
        let Self::FixedResponse {
            status_code,
            content_type,
            message_body,
        } = self;

        let mut config = json!({ "StatusCode": status_code.to_string() });
        if let Some(content_type) = content_type {
            config["ContentType"] = json!(content_type);
        }
        if let Some(body) = message_body {
            config["MessageBody"] = json!(body);
        }
        json!({ "FixedResponseConfig": config, "Type": "fixed-response" })
    }
}

#[derive(Debug, Clone)]
pub struct ListenerProps {
    pub port: u16,
    pub protocol: ApplicationProtocol,
    /// Certificate ARNs, usually references
    pub certificates: Vec<Value>,
    pub ssl_policy: Option<SslPolicy>,
    pub default_action: ListenerAction,
    /// Open the port to the world in the load balancer's security group
    pub open: bool,
}

/// Mutual authentication block of an HTTPS listener
#[derive(Debug, Clone, PartialEq)]
pub struct MutualAuthentication {
    pub mode: MutualAuthenticationMode,
    pub trust_store_arn: Option<Value>,
    pub ignore_client_certificate_expiry: bool,
}

impl MutualAuthentication {
    fn to_json(&self) -> Value {
        let mut block = json!({
            "IgnoreClientCertificateExpiry": self.ignore_client_certificate_expiry,
            "Mode": self.mode.as_str(),
        });
        if let Some(arn) = &self.trust_store_arn {
            block["TrustStoreArn"] = arn.clone();
        }
        block
    }
}

#[derive(Debug, Clone)]
pub struct Listener {
    logical_id: String,
    protocol: ApplicationProtocol,
}

impl Listener {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn protocol(&self) -> ApplicationProtocol {
        self.protocol
    }

    pub fn listener_arn(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    /// Patch the listener with client certificate authentication
    pub fn set_mutual_authentication(
        &self,
        stack: &mut Stack,
        authentication: MutualAuthentication,
    ) -> SynthResult<()> {
        validate_mutual_authentication(
            self.protocol,
            authentication.mode,
            authentication.trust_store_arn.is_some(),
        )?;

        info!(
            "Listener {} mutual authentication: {}",
            self.logical_id, authentication.mode
        );
        stack.set_property(&self.logical_id, "MutualAuthentication", authentication.to_json())
    }
}
