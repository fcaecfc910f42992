// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bucket Deployment
//!
//! Copies inline objects into a bucket at deploy time. CloudFormation has no
//! native resource for this, so the deployment is a custom resource backed by
//! a small Lambda handler. The handler, its role and its policy are shared by
//! every deployment in a stack and created on first use.

use serde_json::{json, Value};
use tracing::debug;

use super::iam::{Policy, PolicyStatement, Principal, Role};
use super::s3::Bucket;
use crate::domain::invariants::validate_object_key;
use crate::domain::ResourceType;
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::{intrinsic, RemovalPolicy};

/// Construct path of the shared handler
const HANDLER_ID: &str = "CustomCDKBucketDeploymentHandler";

const HANDLER_RUNTIME: &str = "python3.12";
const HANDLER_TIMEOUT_SECONDS: u32 = 900;
const HANDLER_SOURCE: &str = include_str!("assets/bucket_deployment_handler.py");

/// Actions the handler needs on the destination bucket
const DESTINATION_ACTIONS: &[&str] = &[
    "s3:GetObject*",
    "s3:GetBucket*",
    "s3:List*",
    "s3:DeleteObject*",
    "s3:PutObject",
    "s3:PutObjectLegalHold",
    "s3:PutObjectRetention",
    "s3:PutObjectTagging",
    "s3:PutObjectVersionTagging",
    "s3:Abort*",
];

/// One object to place in the destination bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    key: String,
    body: String,
}

impl Source {
    /// An object with inline text content
    pub fn data(key: impl Into<String>, body: impl Into<String>) -> SynthResult<Self> {
        let key = key.into();
        validate_object_key(&key)?;
        Ok(Self {
            key,
            body: body.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn to_json(&self) -> Value {
        json!({ "Key": self.key, "Body": self.body })
    }
}

#[derive(Debug, Clone)]
pub struct BucketDeploymentProps {
    pub sources: Vec<Source>,
    pub destination_key_prefix: Option<String>,
    /// Unpack archive sources; inline data is copied as is
    pub extract: bool,
    /// Remove objects under the prefix that are not part of this deployment
    pub prune: bool,
    /// Keep deployed objects when the deployment is deleted
    pub retain_on_delete: bool,
}

impl Default for BucketDeploymentProps {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            destination_key_prefix: None,
            extract: true,
            prune: true,
            retain_on_delete: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BucketDeployment {
    logical_id: String,
}

impl BucketDeployment {
    pub fn new(
        stack: &mut Stack,
        id: &str,
        destination: &Bucket,
        props: BucketDeploymentProps,
    ) -> SynthResult<Self> {
        let handler = Handler::ensure(stack)?;
        handler.grant_read_write(stack, destination)?;

        let mut properties = json!({
            "ServiceToken": intrinsic::get_att(&handler.function_id, "Arn"),
            "SourceObjects": props.sources.iter().map(Source::to_json).collect::<Vec<_>>(),
            "DestinationBucketName": destination.bucket_name(),
            "Extract": props.extract,
            "Prune": props.prune,
            "RetainOnDelete": props.retain_on_delete,
        });
        if let (Some(prefix), Some(map)) = (&props.destination_key_prefix, properties.as_object_mut()) {
            map.insert("DestinationBucketKeyPrefix".to_string(), json!(prefix));
        }

        let logical_id = stack.add_resource(
            &[id, "CustomResource", "Default"],
            ResourceType::BucketDeployment,
            properties,
        )?;
        let resource = stack.resource_mut(&logical_id)?;
        resource.update_replace_policy = Some(RemovalPolicy::Delete);
        resource.deletion_policy = Some(RemovalPolicy::Delete);

        debug!(
            "Bucket deployment {} copies {} object(s) into {}",
            logical_id,
            props.sources.len(),
            destination.logical_id()
        );

        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Name of the destination bucket, available once the deployment finished
    ///
    /// Referencing this instead of the bucket itself orders the consumer after
    /// the upload.
    pub fn deployed_bucket_name(&self) -> Value {
        intrinsic::get_att(&self.logical_id, "DestinationBucketName")
    }
}

/// The shared Lambda function behind every deployment in a stack
struct Handler {
    function_id: String,
    policy: Policy,
}

impl Handler {
    fn ensure(stack: &mut Stack) -> SynthResult<Self> {
        let function_id = Stack::logical_id(&[HANDLER_ID, "Resource"]);
        let policy_path = [HANDLER_ID, "ServiceRole", "DefaultPolicy", "Resource"];

        if stack.resource(&function_id).is_some() {
            return Ok(Self {
                function_id,
                policy: Policy::existing(Stack::logical_id(&policy_path)),
            });
        }

        let role = Role::new(
            stack,
            &[HANDLER_ID, "ServiceRole", "Resource"],
            Principal::Service("lambda.amazonaws.com".to_string()),
            &["service-role/AWSLambdaBasicExecutionRole"],
        )?;
        let policy = Policy::attach(stack, &policy_path, &role)?;

        let function_id = stack.add_resource(
            &[HANDLER_ID, "Resource"],
            ResourceType::Function,
            json!({
                "Code": { "ZipFile": HANDLER_SOURCE },
                "Handler": "index.handler",
                "Role": role.role_arn(),
                "Runtime": HANDLER_RUNTIME,
                "Timeout": HANDLER_TIMEOUT_SECONDS,
            }),
        )?;
        stack.add_dependency(&function_id, role.logical_id())?;
        stack.add_dependency(&function_id, policy.logical_id())?;

        debug!("Created bucket deployment handler {}", function_id);
        Ok(Self {
            function_id,
            policy,
        })
    }

    fn grant_read_write(&self, stack: &mut Stack, bucket: &Bucket) -> SynthResult<()> {
        let statement = PolicyStatement::allow()
            .actions(DESTINATION_ACTIONS.iter().copied())
            .resources([bucket.bucket_arn(), bucket.arn_for_objects("*")]);
        self.policy.add_statement(stack, &statement)
    }
}
