// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template assertions
//!
//! Inspect a rendered CloudFormation template the way infrastructure unit
//! tests usually do: count resources of a type, and look for resources or
//! outputs matching a pattern.
//!
//! ```
//! use alb_mtls_assertions::{Match, Template};
//! use serde_json::json;
//!
//! let template = Template::from_json(json!({
//!     "Resources": {
//!         "Listener": {
//!             "Type": "AWS::ElasticLoadBalancingV2::Listener",
//!             "Properties": { "Port": 443, "Protocol": "HTTPS" }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! template.resource_count_is("AWS::ElasticLoadBalancingV2::Listener", 1).unwrap();
//! template
//!     .has_resource_properties("AWS::ElasticLoadBalancingV2::Listener", json!({ "Port": 443 }))
//!     .unwrap();
//! template
//!     .has_resource_properties(
//!         "AWS::ElasticLoadBalancingV2::Listener",
//!         Match::object_with([("SslPolicy", Match::absent())]),
//!     )
//!     .unwrap();
//! ```
//!
//! # Pattern semantics
//!
//! - A plain JSON value given as a properties pattern matches object-like at
//!   the top level: listed keys must match, other keys are ignored.
//! - Below the top level, literal values match exactly, objects included.
//! - [`Match`] builds matchers for the other cases.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why an assertion failed
#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected {expected} resource(s) of type {resource_type}, found {actual}")]
    CountMismatch {
        resource_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("No {resource_type} resource matches ({} candidate(s)):\n{}", .reasons.len(), .reasons.join("\n"))]
    NoMatch {
        resource_type: String,
        reasons: Vec<String>,
    },

    #[error("Resource {logical_id} does not match: {reason}")]
    Mismatch { logical_id: String, reason: String },

    #[error("No output {0} matches")]
    OutputNotFound(String),
}

pub type AssertionResult<T = ()> = Result<T, AssertionError>;

/// A pattern tested against part of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// A plain value; objects become object-like at the top of a pattern
    Literal(Value),
    /// Deep equality
    Exact(Value),
    /// Listed keys must match, other keys are ignored
    ObjectLike(BTreeMap<String, Matcher>),
    /// The array contains these elements in this order, possibly with others between
    ArrayWith(Vec<Matcher>),
    /// The key is not present
    Absent,
    /// The key is present with any non-null value
    AnyValue,
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl Matcher {
    /// Test `actual`, which is `None` when the key is missing
    pub fn test(&self, actual: Option<&Value>) -> Result<(), String> {
        self.check(actual, "")
    }

    /// Object-like view of a top level literal object
    fn top_level(self) -> Self {
        match self {
            Self::Literal(value @ Value::Object(_)) => Match::object_like(value),
            other => other,
        }
    }

    fn check(&self, actual: Option<&Value>, path: &str) -> Result<(), String> {
        let at = if path.is_empty() { "/" } else { path };

        match self {
            Self::Absent => match actual {
                None => Ok(()),
                Some(value) => Err(format!("{}: expected absent, found {}", at, value)),
            },
            Self::AnyValue => match actual {
                None | Some(Value::Null) => Err(format!("{}: expected a value, found nothing", at)),
                Some(_) => Ok(()),
            },
            Self::Literal(expected) | Self::Exact(expected) => {
                let value = actual.ok_or_else(|| format!("{}: missing, expected {}", at, expected))?;
                if value == expected {
                    Ok(())
                } else {
                    Err(format!("{}: expected {}, found {}", at, expected, value))
                }
            }
            Self::ObjectLike(entries) => {
                let Some(Value::Object(object)) = actual else {
                    return Err(format!("{}: expected an object", at));
                };
                for (key, matcher) in entries {
                    matcher.check(object.get(key), &format!("{}/{}", path, key))?;
                }
                Ok(())
            }
            Self::ArrayWith(items) => {
                let Some(Value::Array(array)) = actual else {
                    return Err(format!("{}: expected an array", at));
                };
                let mut remaining = array.iter().enumerate();
                for (index, matcher) in items.iter().enumerate() {
                    let found = remaining
                        .by_ref()
                        .any(|(i, value)| matcher.check(Some(value), &format!("{}/{}", path, i)).is_ok());
                    if !found {
                        return Err(format!("{}: no element matches pattern item {}", at, index));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Matcher constructors
pub struct Match;

impl Match {
    /// Keys of `value` must match exactly; other keys are ignored
    pub fn object_like(value: Value) -> Matcher {
        match value {
            Value::Object(map) => Matcher::ObjectLike(
                map.into_iter()
                    .map(|(key, value)| (key, Matcher::Exact(value)))
                    .collect(),
            ),
            other => Matcher::Exact(other),
        }
    }

    /// Object-like with a matcher per key
    pub fn object_with<I, K>(entries: I) -> Matcher
    where
        I: IntoIterator<Item = (K, Matcher)>,
        K: Into<String>,
    {
        Matcher::ObjectLike(entries.into_iter().map(|(k, m)| (k.into(), m)).collect())
    }

    pub fn exact(value: Value) -> Matcher {
        Matcher::Exact(value)
    }

    pub fn array_with<I, M>(items: I) -> Matcher
    where
        I: IntoIterator<Item = M>,
        M: Into<Matcher>,
    {
        Matcher::ArrayWith(items.into_iter().map(Into::into).collect())
    }

    pub fn absent() -> Matcher {
        Matcher::Absent
    }

    pub fn any_value() -> Matcher {
        Matcher::AnyValue
    }
}

/// A rendered template under test
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    json: Value,
}

impl Template {
    /// Wrap a rendered template; it must have a `Resources` object
    pub fn from_json(json: Value) -> AssertionResult<Self> {
        match json.get("Resources") {
            Some(Value::Object(_)) => Ok(Self { json }),
            _ => Err(AssertionError::InvalidTemplate(
                "missing Resources section".to_string(),
            )),
        }
    }

    /// Parse a template from JSON text
    pub fn parse(text: &str) -> AssertionResult<Self> {
        Self::from_json(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> &Value {
        &self.json
    }

    fn section(&self, name: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.json
            .get(name)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
    }

    /// Resources of one type, keyed by logical id
    fn resources_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.section("Resources")
            .filter(move |(_, resource)| resource.get("Type").and_then(Value::as_str) == Some(resource_type))
    }

    pub fn resource_count_is(&self, resource_type: &str, expected: usize) -> AssertionResult {
        let actual = self.resources_of_type(resource_type).count();
        if actual != expected {
            return Err(AssertionError::CountMismatch {
                resource_type: resource_type.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Some resource of the type has properties matching `pattern`
    pub fn has_resource_properties(&self, resource_type: &str, pattern: impl Into<Matcher>) -> AssertionResult {
        let matcher = pattern.into().top_level();
        let empty = Value::Object(Map::new());

        let mut reasons = Vec::new();
        for (id, resource) in self.resources_of_type(resource_type) {
            let properties = resource.get("Properties").unwrap_or(&empty);
            match matcher.test(Some(properties)) {
                Ok(()) => return Ok(()),
                Err(reason) => reasons.push(format!("{}: {}", id, reason)),
            }
        }

        Err(AssertionError::NoMatch {
            resource_type: resource_type.to_string(),
            reasons,
        })
    }

    /// Some resource of the type matches `pattern` as a whole
    /// (`Properties`, `DependsOn`, `DeletionPolicy`, ...)
    pub fn has_resource(&self, resource_type: &str, pattern: impl Into<Matcher>) -> AssertionResult {
        let matcher = pattern.into().top_level();

        let mut reasons = Vec::new();
        for (id, resource) in self.resources_of_type(resource_type) {
            match matcher.test(Some(resource)) {
                Ok(()) => return Ok(()),
                Err(reason) => reasons.push(format!("{}: {}", id, reason)),
            }
        }

        Err(AssertionError::NoMatch {
            resource_type: resource_type.to_string(),
            reasons,
        })
    }

    /// Every resource of the type matching `pattern` as a whole
    pub fn find_resources(&self, resource_type: &str, pattern: impl Into<Matcher>) -> BTreeMap<String, Value> {
        let matcher = pattern.into().top_level();
        self.resources_of_type(resource_type)
            .filter(|(_, resource)| matcher.test(Some(resource)).is_ok())
            .map(|(id, resource)| (id.clone(), resource.clone()))
            .collect()
    }

    /// Every resource of the type has properties matching `pattern`
    ///
    /// Fails when there is no resource of the type at all.
    pub fn all_resources_properties(&self, resource_type: &str, pattern: impl Into<Matcher>) -> AssertionResult {
        let matcher = pattern.into().top_level();
        let empty = Value::Object(Map::new());

        let mut seen = 0;
        for (id, resource) in self.resources_of_type(resource_type) {
            seen += 1;
            let properties = resource.get("Properties").unwrap_or(&empty);
            matcher
                .test(Some(properties))
                .map_err(|reason| AssertionError::Mismatch {
                    logical_id: id.clone(),
                    reason,
                })?;
        }

        if seen == 0 {
            return Err(AssertionError::CountMismatch {
                resource_type: resource_type.to_string(),
                expected: 1,
                actual: 0,
            });
        }
        Ok(())
    }

    /// An output `id` (or any output, for `*`) matches `pattern`
    pub fn has_output(&self, id: &str, pattern: impl Into<Matcher>) -> AssertionResult {
        let matcher = pattern.into().top_level();
        let found = self
            .section("Outputs")
            .filter(|(name, _)| id == "*" || name.as_str() == id)
            .any(|(_, output)| matcher.test(Some(output)).is_ok());

        if found {
            Ok(())
        } else {
            Err(AssertionError::OutputNotFound(id.to_string()))
        }
    }
}
