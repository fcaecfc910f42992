// Copyright (c) 2025 - Cowboy AI, Inc.
//! CloudFormation Template Model
//!
//! The rendered form of a stack: resources keyed by logical id, stack
//! outputs, and the JSON serialization CloudFormation consumes.
//!
//! Every map is a `BTreeMap` (and `serde_json::Map` is sorted as well), so
//! rendering the same declaration twice yields byte-identical output.

pub mod graph;
pub mod intrinsic;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::invariants::validate_logical_id;
use crate::domain::ResourceType;
use crate::errors::{SynthError, SynthResult};

pub use graph::{dependencies, dependency_order, order_index, validate_references};

/// Template format version emitted in every template
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Metadata key holding the construct path of a resource
pub const CONSTRUCT_PATH_METADATA: &str = "aws:cdk:path";

/// What CloudFormation does with a resource on deletion or replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// A single resource declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: ResourceType,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Resource {
    pub fn new(resource_type: ResourceType, properties: Map<String, Value>) -> Self {
        Self {
            resource_type,
            properties,
            depends_on: BTreeSet::new(),
            update_replace_policy: None,
            deletion_policy: None,
            metadata: Map::new(),
        }
    }

    /// Apply the same policy on replacement and deletion
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.update_replace_policy = Some(policy);
        self.deletion_policy = Some(policy);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Logical ids referenced from properties, excluding explicit `DependsOn`
    pub fn implicit_dependencies(&self) -> BTreeSet<String> {
        self.properties
            .values()
            .flat_map(intrinsic::references)
            .collect()
    }
}

/// A stack output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A complete CloudFormation template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a resource under a new logical id
    pub fn add_resource(&mut self, logical_id: impl Into<String>, resource: Resource) -> SynthResult<()> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;

        if self.resources.contains_key(&logical_id) || self.outputs.contains_key(&logical_id) {
            return Err(SynthError::DuplicateLogicalId(logical_id));
        }

        self.resources.insert(logical_id, resource);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resource_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.resources.get_mut(logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    /// Record an explicit `DependsOn` from one resource to another
    pub fn add_dependency(&mut self, from: &str, to: &str) -> SynthResult<()> {
        if !self.resources.contains_key(to) {
            return Err(SynthError::UnresolvedReference {
                from: from.to_string(),
                target: to.to_string(),
            });
        }

        let resource = self
            .resources
            .get_mut(from)
            .ok_or_else(|| SynthError::UnresolvedReference {
                from: to.to_string(),
                target: from.to_string(),
            })?;

        resource.depends_on.insert(to.to_string());
        Ok(())
    }

    pub fn add_output(&mut self, logical_id: impl Into<String>, output: Output) -> SynthResult<()> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;

        if self.resources.contains_key(&logical_id) || self.outputs.contains_key(&logical_id) {
            return Err(SynthError::DuplicateLogicalId(logical_id));
        }

        self.outputs.insert(logical_id, output);
        Ok(())
    }

    /// Logical ids of every resource of the given type
    pub fn resources_of_type(&self, resource_type: ResourceType) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.resource_type == resource_type)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Check references and ordering, then render to JSON
    pub fn to_json(&self) -> SynthResult<Value> {
        validate_references(self)?;
        dependency_order(self)?;
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> SynthResult<String> {
        let value = self.to_json()?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
