// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for stack synthesis

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{DomainNameError, NetworkError, ValidationError};

/// Errors that can occur while declaring or synthesizing a stack
#[derive(Debug, Error)]
pub enum SynthError {
    /// Domain name validation error
    #[error("Invalid domain name: {0}")]
    DomainName(#[from] DomainNameError),

    /// Network value validation error
    #[error("Invalid network value: {0}")]
    Network(#[from] NetworkError),

    /// Resource attribute validation error
    #[error("Invalid resource configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Two constructs rendered to the same logical id
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// A Ref, GetAtt or DependsOn names a resource that does not exist
    #[error("Resource {from} references unknown resource {target}")]
    UnresolvedReference {
        from: String,
        target: String,
    },

    /// The dependency graph contains a cycle
    #[error("Dependency cycle between resources: {0:?}")]
    DependencyCycle(Vec<String>),

    /// No stack with the given name in the app
    #[error("Stack not found: {0}")]
    StackNotFound(String),

    /// CA bundle file could not be read
    #[error("Failed to read CA bundle {path}: {source}")]
    CaBundleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Output directory error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;
