// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack - the unit of deployment
//!
//! A stack owns one [`Template`] and hands out logical ids derived from
//! construct paths. Constructs add resources through it; nothing is
//! rendered until [`Stack::synth`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::domain::{AccountId, ResourceType};
use crate::errors::{SynthError, SynthResult};
use crate::template::{Output, Resource, Template, CONSTRUCT_PATH_METADATA};

/// Path components dropped from the end of a construct path when deriving
/// a logical id
const HIDDEN_PATH_COMPONENTS: &[&str] = &["Resource", "Default"];

/// Maximum CloudFormation stack name length
pub const STACK_NAME_MAX: usize = 128;

/// Target account and region of a stack
///
/// Both unknown by default, which renders an environment-agnostic template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub account: Option<AccountId>,
    pub region: Option<String>,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aws://{}/{}",
            self.account
                .as_ref()
                .map(AccountId::as_str)
                .unwrap_or("unknown-account"),
            self.region.as_deref().unwrap_or("unknown-region")
        )
    }
}

/// A named collection of resources deployed as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    name: String,
    environment: Environment,
    template: Template,
}

impl Stack {
    /// Create an empty stack
    ///
    /// # Invariants
    /// - Name is 1-128 characters of ASCII alphanumerics and hyphens
    /// - Name starts with a letter
    pub fn new(name: impl Into<String>, environment: Environment) -> SynthResult<Self> {
        let name = name.into();

        let valid = !name.is_empty()
            && name.len() <= STACK_NAME_MAX
            && name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

        if !valid {
            return Err(SynthError::Configuration(format!(
                "invalid stack name: {:?}",
                name
            )));
        }

        Ok(Self {
            name,
            environment,
            template: Template::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.template.description = Some(description.into());
    }

    /// Derive the logical id for a construct path
    ///
    /// Non-alphanumeric characters are stripped from each component, and
    /// trailing `Resource` / `Default` components are dropped, so
    /// `["MyALB", "Resource"]` becomes `MyALB` and
    /// `["MyVPC", "PublicSubnet1", "Subnet"]` becomes `MyVPCPublicSubnet1Subnet`.
    pub fn logical_id(path: &[&str]) -> String {
        let mut components = path;
        while let Some((last, rest)) = components.split_last() {
            if rest.is_empty() || !HIDDEN_PATH_COMPONENTS.contains(last) {
                break;
            }
            components = rest;
        }

        components
            .iter()
            .flat_map(|component| component.chars())
            .filter(char::is_ascii_alphanumeric)
            .collect()
    }

    /// Full construct path including the stack name
    pub fn construct_path(&self, path: &[&str]) -> String {
        std::iter::once(self.name.as_str())
            .chain(path.iter().copied())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Add a resource at a construct path and return its logical id
    pub fn add_resource(
        &mut self,
        path: &[&str],
        resource_type: ResourceType,
        properties: Value,
    ) -> SynthResult<String> {
        let properties = match properties {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(SynthError::Configuration(format!(
                    "properties of {} must be an object, got {}",
                    resource_type, other
                )))
            }
        };

        let mut resource = Resource::new(resource_type, properties);
        resource.metadata.insert(
            CONSTRUCT_PATH_METADATA.to_string(),
            Value::String(self.construct_path(path)),
        );

        self.insert(path, resource)
    }

    /// Add a fully built resource at a construct path and return its logical id
    pub fn insert(&mut self, path: &[&str], resource: Resource) -> SynthResult<String> {
        let logical_id = Self::logical_id(path);
        debug!(
            "Adding {} as {} in stack {}",
            resource.resource_type, logical_id, self.name
        );
        self.template.add_resource(logical_id.clone(), resource)?;
        Ok(logical_id)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.template.resource(logical_id)
    }

    /// Mutable access for property overrides after a construct is created
    pub fn resource_mut(&mut self, logical_id: &str) -> SynthResult<&mut Resource> {
        let stack = self.name.clone();
        self.template
            .resource_mut(logical_id)
            .ok_or(SynthError::UnresolvedReference {
                from: stack,
                target: logical_id.to_string(),
            })
    }

    /// Set a single property, replacing any previous value
    pub fn set_property(&mut self, logical_id: &str, key: &str, value: Value) -> SynthResult<()> {
        self.resource_mut(logical_id)?
            .properties
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Make `from` wait for `to` via `DependsOn`
    pub fn add_dependency(&mut self, from: &str, to: &str) -> SynthResult<()> {
        debug!("{} now depends on {}", from, to);
        self.template.add_dependency(from, to)
    }

    pub fn add_output(
        &mut self,
        id: &str,
        value: Value,
        description: Option<&str>,
    ) -> SynthResult<()> {
        self.template.add_output(
            Self::logical_id(&[id]),
            Output {
                value,
                description: description.map(str::to_string),
            },
        )
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Validate and render the template
    pub fn synth(&self) -> SynthResult<Value> {
        self.template.to_json()
    }
}
