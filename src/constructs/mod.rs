// Copyright (c) 2025 - Cowboy AI, Inc.
//! Constructs
//!
//! Builders that add the resources of one AWS service to a [`Stack`] and
//! return a handle with reference helpers (`Ref` / `Fn::GetAtt`) for wiring
//! into other constructs.
//!
//! A builder that fails part way may already have added resources to the
//! stack it was given. Callers that need all-or-nothing declaration build
//! into a fresh [`Stack`] and attach it to the app only once every builder
//! has succeeded, as [`AlbMtlsStack::with_bundle`] does.
//!
//! [`Stack`]: crate::stack::Stack
//! [`AlbMtlsStack::with_bundle`]: crate::AlbMtlsStack::with_bundle

pub mod acm;
pub mod ec2;
pub mod elbv2;
pub mod iam;
pub mod route53;
pub mod s3;
pub mod s3_deployment;

pub use acm::{Certificate, CertificateValidation};
pub use ec2::{SubnetConfiguration, SubnetType, Vpc, VpcProps};
pub use elbv2::{
    ApplicationLoadBalancer, ApplicationLoadBalancerProps, ApplicationProtocol, Listener,
    ListenerAction, ListenerProps, MutualAuthentication, MutualAuthenticationMode, SslPolicy,
    TrustStore, TrustStoreProps,
};
pub use iam::{Policy, PolicyDocument, PolicyStatement, Principal, Role};
pub use route53::{ARecord, AliasTarget, HostedZoneRef, RecordTarget};
pub use s3::{BlockPublicAccess, Bucket, BucketEncryption, BucketProps};
pub use s3_deployment::{BucketDeployment, BucketDeploymentProps, Source};
