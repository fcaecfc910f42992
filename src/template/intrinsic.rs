// Copyright (c) 2025 - Cowboy AI, Inc.
//! CloudFormation Intrinsic Functions
//!
//! Builders for the intrinsic function objects that wire resources together
//! (`Ref`, `Fn::GetAtt`, `Fn::Join`, ...) and a walker that recovers the
//! logical ids a property value refers to.

use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Pseudo parameters CloudFormation resolves itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Partition,
    Region,
    AccountId,
    UrlSuffix,
    StackName,
}

impl Pseudo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partition => "AWS::Partition",
            Self::Region => "AWS::Region",
            Self::AccountId => "AWS::AccountId",
            Self::UrlSuffix => "AWS::URLSuffix",
            Self::StackName => "AWS::StackName",
        }
    }
}

/// Prefix shared by every pseudo parameter
pub const PSEUDO_PREFIX: &str = "AWS::";

/// `{"Ref": logical_id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Ref": "AWS::..."}`
pub fn pseudo(parameter: Pseudo) -> Value {
    json!({ "Ref": parameter.as_str() })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Join": [delimiter, parts]}`
pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

/// `{"Fn::Select": [index, list]}`
pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// `{"Fn::Split": [delimiter, source]}`
pub fn split(delimiter: &str, source: Value) -> Value {
    json!({ "Fn::Split": [delimiter, source] })
}

/// `{"Fn::GetAZs": region}`; an empty region means the stack's region
pub fn get_azs(region: &str) -> Value {
    json!({ "Fn::GetAZs": region })
}

/// `arn:<partition>:<service>:<region>:<account>:<resource>` with the
/// partition left to CloudFormation
pub fn partition_arn(service: &str, region: &str, account: &str, resource: &str) -> Value {
    join(
        "",
        vec![
            json!("arn:"),
            pseudo(Pseudo::Partition),
            json!(format!(":{}:{}:{}:{}", service, region, account, resource)),
        ],
    )
}

/// Whether `name` is a pseudo parameter rather than a logical id
pub fn is_pseudo(name: &str) -> bool {
    name.starts_with(PSEUDO_PREFIX)
}

/// Collect the logical ids referenced through `Ref` and `Fn::GetAtt`
///
/// Pseudo parameters are skipped. Both the array and the dotted string form
/// of `Fn::GetAtt` are recognised.
pub fn references(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_references(value, &mut found);
    found
}

fn collect_references(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    if !is_pseudo(target) {
                        found.insert(target.clone());
                    }
                    return;
                }

                match map.get("Fn::GetAtt") {
                    Some(Value::Array(parts)) => {
                        if let Some(Value::String(target)) = parts.first() {
                            found.insert(target.clone());
                        }
                        return;
                    }
                    Some(Value::String(dotted)) => {
                        if let Some((target, _)) = dotted.split_once('.') {
                            found.insert(target.to_string());
                        }
                        return;
                    }
                    _ => {}
                }
            }

            for nested in map.values() {
                collect_references(nested, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        assert_eq!(reference("Bucket"), json!({ "Ref": "Bucket" }));
        assert_eq!(
            get_att("MyALB", "DNSName"),
            json!({ "Fn::GetAtt": ["MyALB", "DNSName"] })
        );
        assert_eq!(
            select(1, get_azs("")),
            json!({ "Fn::Select": [1, { "Fn::GetAZs": "" }] })
        );
    }

    #[test]
    fn test_partition_arn() {
        assert_eq!(
            partition_arn("iam", "", "582318560864", "root"),
            json!({ "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::582318560864:root"]] })
        );
    }

    #[test]
    fn test_references_walks_nested_values() {
        let value = json!({
            "LoadBalancerArn": { "Ref": "MyALB" },
            "Certificates": [{ "CertificateArn": { "Ref": "Certificate" } }],
            "Principal": { "AWS": join("", vec![json!("arn:"), pseudo(Pseudo::Partition)]) },
            "Target": { "Fn::GetAtt": ["DeployCaCertCustomResource", "DestinationBucketName"] },
            "Legacy": { "Fn::GetAtt": "Role.Arn" },
        });

        let found: Vec<String> = references(&value).into_iter().collect();
        assert_eq!(
            found,
            vec!["Certificate", "DeployCaCertCustomResource", "MyALB", "Role"]
        );
    }

    #[test]
    fn test_references_ignores_literals() {
        assert!(references(&json!({ "Ref": 42, "Name": "Ref" })).is_empty());
        assert!(references(&json!("Bucket")).is_empty());
    }
}
