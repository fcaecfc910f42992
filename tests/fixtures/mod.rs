// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for alb-mtls
//!
//! Stack configurations and rendered templates shared by the integration
//! tests. The CA bundle is the `root_cert.pem` checked in at the crate root,
//! so every fixture renders the same template.

#![allow(dead_code)]

use std::path::PathBuf;

use alb_mtls::{AlbMtlsStack, App, StackConfig, SynthResult};
use alb_mtls_assertions::Template;
use serde_json::Value;

/// Stack id used by the stack tests
pub const STACK_ID: &str = "MyTestStack";

pub const LOAD_BALANCER: &str = "AWS::ElasticLoadBalancingV2::LoadBalancer";
pub const LISTENER: &str = "AWS::ElasticLoadBalancingV2::Listener";
pub const TRUST_STORE: &str = "AWS::ElasticLoadBalancingV2::TrustStore";
pub const BUCKET: &str = "AWS::S3::Bucket";
pub const BUCKET_POLICY: &str = "AWS::S3::BucketPolicy";
pub const BUCKET_DEPLOYMENT: &str = "Custom::CDKBucketDeployment";
pub const CERTIFICATE: &str = "AWS::CertificateManager::Certificate";
pub const RECORD_SET: &str = "AWS::Route53::RecordSet";

/// The checked-in CA bundle
pub fn root_cert_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("root_cert.pem")
}

/// Default configuration reading the checked-in CA bundle
pub fn config() -> StackConfig {
    StackConfig {
        ca_bundle_path: root_cert_path(),
        ..StackConfig::default()
    }
}

/// Declare the stack into a fresh app
pub fn declare(config: &StackConfig) -> SynthResult<(App, AlbMtlsStack)> {
    let mut app = App::new();
    let declared = AlbMtlsStack::new(&mut app, STACK_ID, config)?;
    Ok((app, declared))
}

/// Render the default stack
pub fn synth_default() -> SynthResult<Value> {
    let (app, declared) = declare(&config())?;
    app.stack(&declared.stack_name)?.synth()
}

/// The default stack wrapped for assertions
pub fn template() -> Template {
    let rendered = synth_default().expect("default stack renders");
    Template::from_json(rendered).expect("rendered template has resources")
}
