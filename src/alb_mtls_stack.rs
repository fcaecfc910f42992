// Copyright (c) 2025 - Cowboy AI, Inc.
//! ALB mTLS Stack
//!
//! An internet-facing Application Load Balancer that verifies client
//! certificates against a trust store:
//!
//! 1. Hosted zone lookup
//! 2. ACM certificate for `<subdomain>.<zone>`, validated through DNS
//! 3. Private, encrypted, TLS-only bucket for the CA bundle and connection logs
//! 4. Bucket deployment uploading the CA bundle
//! 5. Trust store reading the bundle, created after the upload
//! 6. VPC with public subnets only and no NAT gateways
//! 7. Load balancer writing connection logs to the bucket
//! 8. HTTPS listener with a fixed response and mutual authentication in `verify` mode
//! 9. Alias record for the load balancer
//!
//! The declaration is a straight sequence. Every value is validated up front
//! and the stack only joins the app once all resources were added.

use serde_json::json;
use tracing::info;

use crate::app::App;
use crate::config::StackConfig;
use crate::constructs::{
    ARecord, AliasTarget, ApplicationLoadBalancer, ApplicationLoadBalancerProps, ApplicationProtocol,
    BlockPublicAccess, Bucket, BucketDeployment, BucketDeploymentProps, BucketEncryption, BucketProps,
    Certificate, CertificateValidation, HostedZoneRef, ListenerAction, ListenerProps,
    MutualAuthentication, MutualAuthenticationMode, PolicyStatement, Principal, RecordTarget, Source,
    SubnetConfiguration, SubnetType, TrustStore, TrustStoreProps, Vpc, VpcProps,
};
use crate::domain::{AccountId, CaBundle, DomainName, HostedZoneId, Ipv4Cidr, SubnetMask};
use crate::errors::SynthResult;
use crate::stack::{Environment, Stack};
use crate::template::RemovalPolicy;

/// Listener port
pub const HTTPS_PORT: u16 = 443;

/// Logical ids of the main resources of a declared stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbMtlsStack {
    pub stack_name: String,
    pub record_name: DomainName,
    pub certificate: String,
    pub bucket: String,
    pub deployment: String,
    pub trust_store: String,
    pub vpc: String,
    pub load_balancer: String,
    pub listener: String,
    pub record: String,
}

impl AlbMtlsStack {
    /// Declare the stack in `app`, reading the CA bundle from disk
    pub fn new(app: &mut App, id: &str, config: &StackConfig) -> SynthResult<Self> {
        let bundle = config.load_ca_bundle()?;
        Self::with_bundle(app, id, config, bundle)
    }

    /// Declare the stack with an already loaded CA bundle
    pub fn with_bundle(
        app: &mut App,
        id: &str,
        config: &StackConfig,
        bundle: CaBundle,
    ) -> SynthResult<Self> {
        let zone_name = DomainName::new(config.zone_name.as_str())?;
        let zone = HostedZoneRef::from_hosted_zone_attributes(
            zone_name.clone(),
            HostedZoneId::new(config.hosted_zone_id.as_str())?,
        );
        let record_name = zone_name.subdomain(&config.subdomain)?;
        let log_writer = AccountId::new(config.log_writer_account.as_str())?;
        let cidr = Ipv4Cidr::new(&config.vpc_cidr)?;
        let subnet_mask = SubnetMask::new(config.subnet_mask)?;
        let environment = Environment {
            account: config.account.as_deref().map(AccountId::new).transpose()?,
            region: config.region.clone(),
        };

        info!(
            "Declaring stack {} for {} ({})",
            id, record_name, environment
        );

        let mut stack = Stack::new(id, environment)?;
        stack.set_description(format!("Application Load Balancer with mutual TLS for {}", record_name));

        let certificate = Certificate::new(
            &mut stack,
            "Certificate",
            &record_name,
            CertificateValidation::Dns(&zone),
        )?;

        let mut bucket = Bucket::new(
            &mut stack,
            "Bucket",
            BucketProps {
                encryption: BucketEncryption::S3Managed,
                block_public_access: Some(BlockPublicAccess::BLOCK_ALL),
                enforce_ssl: true,
                versioned: false,
                removal_policy: RemovalPolicy::Retain,
            },
        )?;
        let log_delivery = PolicyStatement::allow()
            .actions(["s3:PutObject"])
            .principal(Principal::Account(log_writer))
            .resources([bucket.arn_for_objects("*")]);
        bucket.add_to_resource_policy(&mut stack, &log_delivery)?;

        info!(
            "Uploading {} CA certificate(s) as {}",
            bundle.certificate_count(),
            config.ca_bundle_key
        );
        let deployment = BucketDeployment::new(
            &mut stack,
            "DeployCaCert",
            &bucket,
            BucketDeploymentProps {
                sources: vec![Source::data(config.ca_bundle_key.as_str(), bundle.as_pem())?],
                extract: true,
                ..BucketDeploymentProps::default()
            },
        )?;

        let trust_store = TrustStore::new(
            &mut stack,
            "TrustStore",
            TrustStoreProps {
                name: config.trust_store_name.clone(),
                bundle_bucket: deployment.deployed_bucket_name(),
                bundle_key: config.ca_bundle_key.clone(),
            },
        )?;
        stack.add_dependency(trust_store.logical_id(), deployment.logical_id())?;

        let vpc = Vpc::new(
            &mut stack,
            "MyVPC",
            VpcProps {
                cidr,
                enable_dns_hostnames: true,
                enable_dns_support: true,
                max_azs: config.max_azs,
                subnet_configuration: vec![SubnetConfiguration::public("Public", subnet_mask)],
            },
        )?;

        let alb = ApplicationLoadBalancer::new(
            &mut stack,
            "MyALB",
            &vpc,
            ApplicationLoadBalancerProps {
                internet_facing: true,
                subnet_type: SubnetType::Public,
            },
        )?;
        alb.set_attributes(
            &mut stack,
            vec![
                ("connection_logs.s3.enabled", json!("true")),
                ("connection_logs.s3.bucket", bucket.bucket_name()),
            ],
        )?;

        let listener = alb.add_listener(
            &mut stack,
            "ListenerHttps",
            ListenerProps {
                port: HTTPS_PORT,
                protocol: ApplicationProtocol::Https,
                certificates: vec![certificate.certificate_arn()],
                ssl_policy: Some(config.ssl_policy),
                default_action: ListenerAction::fixed_response(200)
                    .with_content_type("text/plain")
                    .with_message_body(config.response_message.as_str()),
                open: true,
            },
        )?;
        listener.set_mutual_authentication(
            &mut stack,
            MutualAuthentication {
                mode: MutualAuthenticationMode::Verify,
                trust_store_arn: Some(trust_store.trust_store_arn()),
                ignore_client_certificate_expiry: false,
            },
        )?;

        let record = ARecord::new(
            &mut stack,
            "Alias",
            &zone,
            &record_name,
            RecordTarget::Alias(AliasTarget::load_balancer(&alb)),
        )?;

        stack.add_output("RecordName", json!(record_name.as_str()), Some("mTLS endpoint"))?;
        stack.add_output(
            "LoadBalancerDnsName",
            alb.dns_name(),
            Some("DNS name of the load balancer"),
        )?;

        let declared = Self {
            stack_name: stack.name().to_string(),
            record_name: record_name.clone(),
            certificate: certificate.logical_id().to_string(),
            bucket: bucket.logical_id().to_string(),
            deployment: deployment.logical_id().to_string(),
            trust_store: trust_store.logical_id().to_string(),
            vpc: vpc.logical_id().to_string(),
            load_balancer: alb.logical_id().to_string(),
            listener: listener.logical_id().to_string(),
            record: record.logical_id().to_string(),
        };

        info!(
            "Stack {} declared with {} resources",
            declared.stack_name,
            stack.template().resources.len()
        );
        app.add_stack(stack)?;
        Ok(declared)
    }
}
