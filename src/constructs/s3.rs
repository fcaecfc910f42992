// Copyright (c) 2025 - Cowboy AI, Inc.
//! S3 bucket with encryption, public access blocking and a resource policy

use serde_json::{json, Map, Value};
use tracing::debug;

use super::iam::{self, PolicyDocument, PolicyStatement, Principal};
use crate::domain::ResourceType;
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::{intrinsic, RemovalPolicy};

/// Server-side encryption at rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketEncryption {
    /// SSE-S3 with S3-managed keys
    #[default]
    S3Managed,
    /// SSE-KMS with the AWS managed `aws/s3` key
    KmsManaged,
}

impl BucketEncryption {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::S3Managed => "AES256",
            Self::KmsManaged => "aws:kms",
        }
    }
}

/// The four public access block switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPublicAccess {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl BlockPublicAccess {
    pub const BLOCK_ALL: Self = Self {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };

    pub fn blocks_all(&self) -> bool {
        *self == Self::BLOCK_ALL
    }

    fn to_json(self) -> Value {
        json!({
            "BlockPublicAcls": self.block_public_acls,
            "BlockPublicPolicy": self.block_public_policy,
            "IgnorePublicAcls": self.ignore_public_acls,
            "RestrictPublicBuckets": self.restrict_public_buckets,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BucketProps {
    pub encryption: BucketEncryption,
    pub block_public_access: Option<BlockPublicAccess>,
    /// Deny every request not made over TLS
    pub enforce_ssl: bool,
    pub versioned: bool,
    pub removal_policy: RemovalPolicy,
}

impl Default for BucketProps {
    fn default() -> Self {
        Self {
            encryption: BucketEncryption::S3Managed,
            block_public_access: Some(BlockPublicAccess::BLOCK_ALL),
            enforce_ssl: true,
            versioned: false,
            removal_policy: RemovalPolicy::Retain,
        }
    }
}

/// An S3 bucket; its policy resource is created on the first statement
#[derive(Debug, Clone)]
pub struct Bucket {
    id: String,
    logical_id: String,
    policy_logical_id: Option<String>,
    removal_policy: RemovalPolicy,
}

impl Bucket {
    pub fn new(stack: &mut Stack, id: &str, props: BucketProps) -> SynthResult<Self> {
        let mut properties = Map::new();
        properties.insert(
            "BucketEncryption".to_string(),
            json!({
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": props.encryption.algorithm() }
                }]
            }),
        );
        if let Some(block) = props.block_public_access {
            properties.insert("PublicAccessBlockConfiguration".to_string(), block.to_json());
        }
        if props.versioned {
            properties.insert(
                "VersioningConfiguration".to_string(),
                json!({ "Status": "Enabled" }),
            );
        }

        let logical_id = stack.add_resource(&[id, "Resource"], ResourceType::Bucket, Value::Object(properties))?;
        let resource = stack.resource_mut(&logical_id)?;
        resource.update_replace_policy = Some(props.removal_policy);
        resource.deletion_policy = Some(props.removal_policy);

        let mut bucket = Self {
            id: id.to_string(),
            logical_id,
            policy_logical_id: None,
            removal_policy: props.removal_policy,
        };

        if props.enforce_ssl {
            let deny_insecure = PolicyStatement::deny()
                .actions(["s3:*"])
                .principal(Principal::Any)
                .condition(json!({ "Bool": { "aws:SecureTransport": "false" } }))
                .resources([bucket.bucket_arn(), bucket.arn_for_objects("*")]);
            bucket.add_to_resource_policy(stack, &deny_insecure)?;
        }

        Ok(bucket)
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn policy_logical_id(&self) -> Option<&str> {
        self.policy_logical_id.as_deref()
    }

    pub fn bucket_name(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    pub fn bucket_arn(&self) -> Value {
        intrinsic::get_att(&self.logical_id, "Arn")
    }

    /// ARN pattern for objects under the bucket, e.g. `<arn>/*`
    pub fn arn_for_objects(&self, key_pattern: &str) -> Value {
        intrinsic::join("", vec![self.bucket_arn(), json!(format!("/{}", key_pattern))])
    }

    /// Append a statement to the bucket policy, creating the policy if needed
    pub fn add_to_resource_policy(
        &mut self,
        stack: &mut Stack,
        statement: &PolicyStatement,
    ) -> SynthResult<()> {
        let policy_id = match &self.policy_logical_id {
            Some(id) => id.clone(),
            None => {
                let id = stack.add_resource(
                    &[self.id.as_str(), "Policy", "Resource"],
                    ResourceType::BucketPolicy,
                    json!({
                        "Bucket": self.bucket_name(),
                        "PolicyDocument": PolicyDocument::default().to_json(),
                    }),
                )?;
                let resource = stack.resource_mut(&id)?;
                resource.update_replace_policy = Some(self.removal_policy);
                resource.deletion_policy = Some(self.removal_policy);
                self.policy_logical_id = Some(id.clone());
                id
            }
        };

        debug!("Adding statement to bucket policy {}", policy_id);
        iam::append_statement(stack, &policy_id, statement)
    }
}
