// Copyright (c) 2025 - Cowboy AI, Inc.
//! Route 53 hosted zone lookups and record sets

use serde_json::{json, Map, Value};
use tracing::debug;

use super::elbv2::ApplicationLoadBalancer;
use crate::domain::invariants::validate_record_in_zone;
use crate::domain::{DomainName, HostedZoneId, ResourceType};
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::intrinsic;

/// An existing public hosted zone
///
/// Imported from its attributes; no resource is emitted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZoneRef {
    zone_name: DomainName,
    hosted_zone_id: HostedZoneId,
}

impl HostedZoneRef {
    pub fn from_hosted_zone_attributes(zone_name: DomainName, hosted_zone_id: HostedZoneId) -> Self {
        Self {
            zone_name,
            hosted_zone_id,
        }
    }

    pub fn zone_name(&self) -> &DomainName {
        &self.zone_name
    }

    pub fn hosted_zone_id(&self) -> &HostedZoneId {
        &self.hosted_zone_id
    }
}

/// Alias target for a record pointing at an AWS managed endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTarget {
    pub dns_name: Value,
    pub hosted_zone_id: Value,
}

impl AliasTarget {
    /// Target an Application Load Balancer
    ///
    /// The `dualstack.` prefix lets the alias answer AAAA queries too.
    pub fn load_balancer(alb: &ApplicationLoadBalancer) -> Self {
        Self {
            dns_name: intrinsic::join("", vec![json!("dualstack."), alb.dns_name()]),
            hosted_zone_id: alb.canonical_hosted_zone_id(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "DNSName": self.dns_name,
            "HostedZoneId": self.hosted_zone_id,
        })
    }
}

/// What a record resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum RecordTarget {
    Alias(AliasTarget),
    Values(Vec<String>),
}

/// Default TTL for value records, in seconds
pub const DEFAULT_TTL: u32 = 1800;

/// An `A` record in a hosted zone
#[derive(Debug, Clone)]
pub struct ARecord {
    logical_id: String,
    record_name: DomainName,
}

impl ARecord {
    pub fn new(
        stack: &mut Stack,
        id: &str,
        zone: &HostedZoneRef,
        record_name: &DomainName,
        target: RecordTarget,
    ) -> SynthResult<Self> {
        validate_record_in_zone(record_name, zone.zone_name())?;

        let mut properties = Map::new();
        properties.insert("HostedZoneId".to_string(), json!(zone.hosted_zone_id().as_str()));
        properties.insert("Name".to_string(), json!(record_name.to_absolute()));
        properties.insert("Type".to_string(), json!("A"));

        match target {
            RecordTarget::Alias(alias) => {
                properties.insert("AliasTarget".to_string(), alias.to_json());
            }
            RecordTarget::Values(values) => {
                properties.insert("ResourceRecords".to_string(), json!(values));
                properties.insert("TTL".to_string(), json!(DEFAULT_TTL.to_string()));
            }
        }

        let logical_id = stack.add_resource(&[id, "Resource"], ResourceType::RecordSet, Value::Object(properties))?;
        debug!("Record {} -> {}", record_name, logical_id);

        Ok(Self {
            logical_id,
            record_name: record_name.clone(),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn record_name(&self) -> &DomainName {
        &self.record_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Environment;

    fn zone() -> HostedZoneRef {
        HostedZoneRef::from_hosted_zone_attributes(
            DomainName::new("kdnakt.com").unwrap(),
            HostedZoneId::new("Z15H9R9Z4PZ27T").unwrap(),
        )
    }

    #[test]
    fn test_value_record() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let name = DomainName::new("www.kdnakt.com").unwrap();
        let record = ARecord::new(
            &mut stack,
            "Www",
            &zone(),
            &name,
            RecordTarget::Values(vec!["192.0.2.1".to_string()]),
        )
        .unwrap();

        let resource = stack.resource(record.logical_id()).unwrap();
        assert_eq!(resource.properties["Name"], json!("www.kdnakt.com."));
        assert_eq!(resource.properties["HostedZoneId"], json!("Z15H9R9Z4PZ27T"));
        assert_eq!(resource.properties["ResourceRecords"], json!(["192.0.2.1"]));
        assert_eq!(resource.properties["TTL"], json!("1800"));
        assert!(resource.property("AliasTarget").is_none());
    }

    #[test]
    fn test_record_outside_zone_rejected() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let name = DomainName::new("mtls-test.example.com").unwrap();
        let result = ARecord::new(&mut stack, "Alias", &zone(), &name, RecordTarget::Values(vec![]));
        assert!(result.is_err());
        assert!(stack.template().resources.is_empty());
    }
}
