// Copyright (c) 2025 - Cowboy AI, Inc.
//! ALB mTLS Stack Tests
//!
//! Render the stack in memory and check the shape of the template: resource
//! counts, listener and mutual authentication settings, bucket hardening, and
//! the creation order CloudFormation will follow.

mod fixtures;

use alb_mtls::template::{order_index, validate_references};
use alb_mtls::{App, AlbMtlsStack};
use alb_mtls_assertions::Match;
use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;
use serde_json::json;

use fixtures::*;

#[test]
fn test_alb_with_mtls_is_properly_configured() -> Result<()> {
    let template = template();

    template.resource_count_is(LOAD_BALANCER, 1)?;
    template.has_resource_properties(
        LISTENER,
        json!({
            "Protocol": "HTTPS",
            "Port": 443,
            "SslPolicy": "ELBSecurityPolicy-TLS13-1-2-2021-06",
        }),
    )?;
    template.resource_count_is(TRUST_STORE, 1)?;

    Ok(())
}

#[test]
fn test_listener_verifies_client_certificates() -> Result<()> {
    let template = template();

    template.resource_count_is(LISTENER, 1)?;
    template.has_resource_properties(
        LISTENER,
        json!({
            "MutualAuthentication": {
                "IgnoreClientCertificateExpiry": false,
                "Mode": "verify",
                "TrustStoreArn": { "Ref": "TrustStore" }
            },
            "Certificates": [{ "CertificateArn": { "Ref": "Certificate" } }],
            "LoadBalancerArn": { "Ref": "MyALB" },
        }),
    )?;
    template.has_resource_properties(
        LISTENER,
        Match::object_with([(
            "DefaultActions",
            Match::array_with([Match::object_with([
                ("Type", json!("fixed-response").into()),
                (
                    "FixedResponseConfig",
                    json!({
                        "ContentType": "text/plain",
                        "MessageBody": "mTLS success!",
                        "StatusCode": "200"
                    })
                    .into(),
                ),
            ])]),
        )]),
    )?;

    Ok(())
}

#[test]
fn test_trust_store_reads_uploaded_bundle() -> Result<()> {
    let template = template();

    template.has_resource(
        TRUST_STORE,
        Match::object_with([
            (
                "Properties",
                Match::object_like(json!({
                    "CaCertificatesBundleS3Bucket": {
                        "Fn::GetAtt": ["DeployCaCertCustomResource", "DestinationBucketName"]
                    },
                    "CaCertificatesBundleS3Key": "root_cert.pem",
                    "Name": "trust-store",
                })),
            ),
            ("DependsOn", Match::array_with([json!("DeployCaCertCustomResource")])),
        ]),
    )?;

    template.resource_count_is(BUCKET_DEPLOYMENT, 1)?;
    template.has_resource_properties(
        BUCKET_DEPLOYMENT,
        json!({
            "DestinationBucketName": { "Ref": "Bucket" },
            "Extract": true,
        }),
    )?;

    let rendered = template.to_json();
    let body = rendered["Resources"]["DeployCaCertCustomResource"]["Properties"]["SourceObjects"][0]["Body"]
        .as_str()
        .unwrap_or_default();
    assert!(body.contains("-----BEGIN CERTIFICATE-----"));

    Ok(())
}

#[test]
fn test_bucket_blocks_public_access_and_enforces_tls() -> Result<()> {
    let template = template();

    template.resource_count_is(BUCKET, 1)?;
    template.has_resource_properties(
        BUCKET,
        json!({
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" }
                }]
            },
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true
            },
        }),
    )?;
    template.has_resource(
        BUCKET,
        json!({ "DeletionPolicy": "Retain", "UpdateReplacePolicy": "Retain" }),
    )?;

    template.resource_count_is(BUCKET_POLICY, 1)?;
    template.has_resource(BUCKET_POLICY, json!({ "DeletionPolicy": "Retain" }))?;
    template.has_resource_properties(
        BUCKET_POLICY,
        Match::object_with([(
            "PolicyDocument",
            Match::object_with([(
                "Statement",
                Match::array_with([
                    Match::object_like(json!({
                        "Action": "s3:*",
                        "Condition": { "Bool": { "aws:SecureTransport": "false" } },
                        "Effect": "Deny",
                        "Principal": { "AWS": "*" },
                    })),
                    Match::object_like(json!({
                        "Action": "s3:PutObject",
                        "Effect": "Allow",
                        "Principal": {
                            "AWS": {
                                "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::582318560864:root"]]
                            }
                        },
                        "Resource": { "Fn::Join": ["", [{ "Fn::GetAtt": ["Bucket", "Arn"] }, "/*"]] },
                    })),
                ]),
            )]),
        )]),
    )?;

    Ok(())
}

#[test]
fn test_load_balancer_writes_connection_logs() -> Result<()> {
    let template = template();

    template.has_resource_properties(
        LOAD_BALANCER,
        json!({
            "Scheme": "internet-facing",
            "Type": "application",
            "LoadBalancerAttributes": [
                { "Key": "connection_logs.s3.enabled", "Value": "true" },
                { "Key": "connection_logs.s3.bucket", "Value": { "Ref": "Bucket" } }
            ],
            "Subnets": [{ "Ref": "MyVPCPublicSubnet1Subnet" }, { "Ref": "MyVPCPublicSubnet2Subnet" }],
        }),
    )?;
    template.has_resource_properties(
        "AWS::EC2::SecurityGroup",
        Match::object_with([(
            "SecurityGroupIngress",
            Match::array_with([Match::object_like(json!({
                "CidrIp": "0.0.0.0/0",
                "FromPort": 443,
                "IpProtocol": "tcp",
                "ToPort": 443,
            }))]),
        )]),
    )?;

    Ok(())
}

#[test]
fn test_vpc_is_public_only() -> Result<()> {
    let template = template();

    template.has_resource_properties(
        "AWS::EC2::VPC",
        json!({
            "CidrBlock": "10.10.10.0/24",
            "EnableDnsHostnames": true,
            "EnableDnsSupport": true,
        }),
    )?;
    template.resource_count_is("AWS::EC2::Subnet", 2)?;
    template.all_resources_properties("AWS::EC2::Subnet", json!({ "MapPublicIpOnLaunch": true }))?;
    template.has_resource_properties("AWS::EC2::Subnet", json!({ "CidrBlock": "10.10.10.0/27" }))?;
    template.has_resource_properties("AWS::EC2::Subnet", json!({ "CidrBlock": "10.10.10.32/27" }))?;
    template.resource_count_is("AWS::EC2::NatGateway", 0)?;
    template.resource_count_is("AWS::EC2::InternetGateway", 1)?;

    Ok(())
}

#[test]
fn test_alias_record_and_certificate() -> Result<()> {
    let template = template();

    template.has_resource_properties(
        CERTIFICATE,
        json!({
            "DomainName": "mtls-test.kdnakt.com",
            "ValidationMethod": "DNS",
            "DomainValidationOptions": [{
                "DomainName": "mtls-test.kdnakt.com",
                "HostedZoneId": "Z15H9R9Z4PZ27T"
            }],
        }),
    )?;

    template.resource_count_is(RECORD_SET, 1)?;
    template.has_resource_properties(
        RECORD_SET,
        json!({
            "Name": "mtls-test.kdnakt.com.",
            "Type": "A",
            "HostedZoneId": "Z15H9R9Z4PZ27T",
            "AliasTarget": {
                "DNSName": { "Fn::Join": ["", ["dualstack.", { "Fn::GetAtt": ["MyALB", "DNSName"] }]] },
                "HostedZoneId": { "Fn::GetAtt": ["MyALB", "CanonicalHostedZoneID"] }
            },
        }),
    )?;

    template.has_output("RecordName", json!({ "Value": "mtls-test.kdnakt.com" }))?;
    template.has_output(
        "LoadBalancerDnsName",
        Match::object_with([("Value", json!({ "Fn::GetAtt": ["MyALB", "DNSName"] }).into())]),
    )?;

    Ok(())
}

#[test]
fn test_creation_order() -> Result<()> {
    let (app, declared) = declare(&config())?;
    let template = app.stack(&declared.stack_name)?.template();

    validate_references(template)?;
    let index = order_index(template)?;
    let position = |id: &str| -> Result<usize> {
        index
            .get(id)
            .copied()
            .ok_or_else(|| anyhow!("{} missing from the creation order", id))
    };

    assert!(position("Bucket")? < position("DeployCaCertCustomResource")?);
    assert!(
        position("CustomCDKBucketDeploymentHandlerServiceRoleDefaultPolicy")?
            < position("DeployCaCertCustomResource")?
    );
    assert!(position("DeployCaCertCustomResource")? < position("TrustStore")?);
    assert!(position("TrustStore")? < position("MyALBListenerHttps")?);
    assert!(position("Certificate")? < position("MyALBListenerHttps")?);
    assert!(position("MyVPCPublicSubnet1DefaultRoute")? < position("MyALB")?);
    assert!(position("MyVPCPublicSubnet2DefaultRoute")? < position("MyALB")?);
    assert!(position("MyALB")? < position("Alias")?);
    assert_eq!(index.len(), template.resources.len());

    Ok(())
}

#[test]
fn test_creation_order_rejects_unknown_resource() -> Result<()> {
    let (app, declared) = declare(&config())?;
    let index = order_index(app.stack(&declared.stack_name)?.template())?;

    assert!(index.get("MyRenamedALB").is_none());
    assert!(index.contains_key("MyALB"));

    Ok(())
}

#[test]
fn test_synthesis_is_idempotent() -> Result<()> {
    let (app, declared) = declare(&config())?;
    let stack = app.stack(&declared.stack_name)?;
    let first = stack.template().to_json_pretty()?;
    let second = stack.template().to_json_pretty()?;
    assert_eq!(first, second);

    let again = serde_json::to_string_pretty(&synth_default()?)?;
    assert_eq!(first, again);

    Ok(())
}

#[test]
fn test_subdomain_flows_through() -> Result<()> {
    let mut config = config();
    config.subdomain = "mtls-prod".to_string();

    let rendered = {
        let mut app = App::new();
        let declared = AlbMtlsStack::new(&mut app, STACK_ID, &config)?;
        app.stack(&declared.stack_name)?.synth()?
    };
    let template = alb_mtls_assertions::Template::from_json(rendered)?;

    template.has_resource_properties(CERTIFICATE, json!({ "DomainName": "mtls-prod.kdnakt.com" }))?;
    template.has_resource_properties(RECORD_SET, json!({ "Name": "mtls-prod.kdnakt.com." }))?;

    Ok(())
}
