// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Load Balancer with mutual TLS, declared as CloudFormation
//!
//! This crate declares an internet-facing ALB that authenticates clients by
//! certificate, together with everything it needs: ACM certificate, Route 53
//! alias, S3 trust store bucket, CA bundle upload and VPC. Declarations are
//! rendered to CloudFormation templates locally; applying them is left to
//! CloudFormation.
//!
//! # Layers
//!
//! - [`domain`] - validated value objects and pure invariant checks
//! - [`template`] - the CloudFormation template model and dependency graph
//! - [`stack`] / [`app`] - logical ids, construct paths and cloud assembly output
//! - [`constructs`] - per-service builders (S3, IAM, ELBv2, EC2, ACM, Route 53)
//! - [`alb_mtls_stack`] - the stack itself

pub mod alb_mtls_stack;
pub mod app;
pub mod config;
pub mod constructs;
pub mod domain;
pub mod errors;
pub mod stack;
pub mod template;

// Re-export commonly used types
pub use alb_mtls_stack::AlbMtlsStack;
pub use app::{App, CloudAssembly};
pub use config::StackConfig;
pub use errors::{SynthError, SynthResult};
pub use stack::{Environment, Stack};
pub use template::Template;
