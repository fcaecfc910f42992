// Copyright (c) 2025 - Cowboy AI, Inc.
//! ACM certificates validated through DNS

use serde_json::{json, Value};
use tracing::debug;

use super::route53::HostedZoneRef;
use crate::domain::invariants::validate_record_in_zone;
use crate::domain::{DomainName, ResourceType};
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::intrinsic;

/// How ACM proves control of the domain
#[derive(Debug, Clone, Copy)]
pub enum CertificateValidation<'a> {
    /// CNAME validation records written into the given zone
    Dns(&'a HostedZoneRef),
    /// Approval mail to the domain contacts
    Email,
}

impl CertificateValidation<'_> {
    fn method(&self) -> &'static str {
        match self {
            Self::Dns(_) => "DNS",
            Self::Email => "EMAIL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Certificate {
    logical_id: String,
    domain_name: DomainName,
}

impl Certificate {
    pub fn new(
        stack: &mut Stack,
        id: &str,
        domain_name: &DomainName,
        validation: CertificateValidation<'_>,
    ) -> SynthResult<Self> {
        let mut properties = json!({
            "DomainName": domain_name.as_str(),
            "Tags": [{ "Key": "Name", "Value": stack.construct_path(&[id]) }],
            "ValidationMethod": validation.method(),
        });

        if let CertificateValidation::Dns(zone) = validation {
            validate_record_in_zone(domain_name, zone.zone_name())?;
            properties["DomainValidationOptions"] = json!([{
                "DomainName": domain_name.as_str(),
                "HostedZoneId": zone.hosted_zone_id().as_str(),
            }]);
        }

        let logical_id = stack.add_resource(&[id, "Resource"], ResourceType::Certificate, properties)?;
        debug!("Certificate {} requested for {}", logical_id, domain_name);

        Ok(Self {
            logical_id,
            domain_name: domain_name.clone(),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn domain_name(&self) -> &DomainName {
        &self.domain_name
    }

    pub fn certificate_arn(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }
}
