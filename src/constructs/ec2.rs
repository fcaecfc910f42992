// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC with public and isolated subnets
//!
//! Subnets are carved from the VPC block in declaration order: every subnet
//! configuration gets one subnet per availability zone. Public subnets route
//! `0.0.0.0/0` through an internet gateway; no NAT gateways are created, so
//! isolated subnets have no route out at all.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::invariants::validate_vpc_layout;
use crate::domain::{Ipv4Cidr, ResourceType, SubnetMask};
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::intrinsic;

/// Destination of the default route
const ANY_IPV4: &str = "0.0.0.0/0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetType {
    /// Routed to an internet gateway
    Public,
    /// No route outside the VPC
    PrivateIsolated,
}

impl SubnetType {
    /// Value of the `aws-cdk:subnet-type` tag
    pub fn tag_value(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::PrivateIsolated => "Isolated",
        }
    }
}

/// One group of subnets, repeated in every availability zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetConfiguration {
    pub name: String,
    pub subnet_type: SubnetType,
    pub cidr_mask: SubnetMask,
    pub map_public_ip_on_launch: bool,
}

impl SubnetConfiguration {
    pub fn public(name: impl Into<String>, cidr_mask: SubnetMask) -> Self {
        Self {
            name: name.into(),
            subnet_type: SubnetType::Public,
            cidr_mask,
            map_public_ip_on_launch: true,
        }
    }

    pub fn isolated(name: impl Into<String>, cidr_mask: SubnetMask) -> Self {
        Self {
            name: name.into(),
            subnet_type: SubnetType::PrivateIsolated,
            cidr_mask,
            map_public_ip_on_launch: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VpcProps {
    pub cidr: Ipv4Cidr,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    pub max_azs: u8,
    pub subnet_configuration: Vec<SubnetConfiguration>,
}

/// A subnet with the routing resources created for it
#[derive(Debug, Clone)]
pub struct Subnet {
    logical_id: String,
    cidr: Ipv4Cidr,
    subnet_type: SubnetType,
    route_table_id: String,
    association_id: String,
    default_route_id: Option<String>,
}

impl Subnet {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn subnet_id(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    pub fn cidr(&self) -> &Ipv4Cidr {
        &self.cidr
    }

    pub fn subnet_type(&self) -> SubnetType {
        self.subnet_type
    }

    pub fn route_table_id(&self) -> &str {
        &self.route_table_id
    }

    /// Resources that must exist before traffic can leave through this subnet
    pub fn internet_connectivity(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.default_route_id.iter().map(String::as_str).collect();
        ids.push(&self.association_id);
        ids
    }
}

#[derive(Debug, Clone)]
pub struct Vpc {
    logical_id: String,
    cidr: Ipv4Cidr,
    subnets: Vec<Subnet>,
    internet_gateway_id: Option<String>,
}

impl Vpc {
    pub fn new(stack: &mut Stack, id: &str, props: VpcProps) -> SynthResult<Self> {
        for config in &props.subnet_configuration {
            validate_vpc_layout(&props.cidr, props.max_azs, config.cidr_mask.value())?;
        }

        let masks: Vec<u8> = props
            .subnet_configuration
            .iter()
            .flat_map(|config| std::iter::repeat(config.cidr_mask.value()).take(usize::from(props.max_azs)))
            .collect();
        let blocks = props.cidr.allocate(&masks)?;

        let logical_id = stack.add_resource(
            &[id, "Resource"],
            ResourceType::Vpc,
            json!({
                "CidrBlock": props.cidr.to_string(),
                "EnableDnsHostnames": props.enable_dns_hostnames,
                "EnableDnsSupport": props.enable_dns_support,
                "InstanceTenancy": "default",
                "Tags": [{ "Key": "Name", "Value": stack.construct_path(&[id]) }],
            }),
        )?;

        let needs_gateway = props
            .subnet_configuration
            .iter()
            .any(|config| config.subnet_type == SubnetType::Public);
        let gateway = if needs_gateway {
            Some(Self::internet_gateway(stack, id, &logical_id)?)
        } else {
            None
        };

        let mut vpc = Self {
            logical_id,
            cidr: props.cidr,
            subnets: Vec::with_capacity(blocks.len()),
            internet_gateway_id: gateway.as_ref().map(|(igw, _)| igw.clone()),
        };

        let mut blocks = blocks.into_iter();
        for config in &props.subnet_configuration {
            for az in 0..usize::from(props.max_azs) {
                let Some(cidr) = blocks.next() else {
                    break;
                };
                let subnet = vpc.add_subnet(stack, id, config, az, cidr, gateway.as_ref())?;
                vpc.subnets.push(subnet);
            }
        }

        info!(
            "VPC {} ({}) with {} subnet(s) across {} AZ(s)",
            vpc.logical_id,
            vpc.cidr,
            vpc.subnets.len(),
            props.max_azs
        );
        Ok(vpc)
    }

    /// Create the gateway and its attachment, returning both logical ids
    fn internet_gateway(stack: &mut Stack, id: &str, vpc_id: &str) -> SynthResult<(String, String)> {
        let igw = stack.add_resource(
            &[id, "IGW"],
            ResourceType::InternetGateway,
            json!({
                "Tags": [{ "Key": "Name", "Value": stack.construct_path(&[id]) }],
            }),
        )?;
        let attachment = stack.add_resource(
            &[id, "VPCGW"],
            ResourceType::VpcGatewayAttachment,
            json!({
                "InternetGatewayId": intrinsic::reference(&igw),
                "VpcId": intrinsic::reference(vpc_id),
            }),
        )?;
        Ok((igw, attachment))
    }

    fn add_subnet(
        &self,
        stack: &mut Stack,
        id: &str,
        config: &SubnetConfiguration,
        az: usize,
        cidr: Ipv4Cidr,
        gateway: Option<&(String, String)>,
    ) -> SynthResult<Subnet> {
        let name = format!("{}Subnet{}", config.name, az + 1);
        let name_tag = stack.construct_path(&[id, name.as_str()]);

        let subnet_id = stack.add_resource(
            &[id, name.as_str(), "Subnet"],
            ResourceType::Subnet,
            json!({
                "AvailabilityZone": intrinsic::select(az, intrinsic::get_azs("")),
                "CidrBlock": cidr.to_string(),
                "MapPublicIpOnLaunch": config.map_public_ip_on_launch,
                "Tags": [
                    { "Key": "Name", "Value": name_tag },
                    { "Key": "aws-cdk:subnet-name", "Value": config.name },
                    { "Key": "aws-cdk:subnet-type", "Value": config.subnet_type.tag_value() },
                ],
                "VpcId": self.vpc_id(),
            }),
        )?;

        let route_table_id = stack.add_resource(
            &[id, name.as_str(), "RouteTable"],
            ResourceType::RouteTable,
            json!({
                "Tags": [{ "Key": "Name", "Value": name_tag }],
                "VpcId": self.vpc_id(),
            }),
        )?;

        let association_id = stack.add_resource(
            &[id, name.as_str(), "RouteTableAssociation"],
            ResourceType::SubnetRouteTableAssociation,
            json!({
                "RouteTableId": intrinsic::reference(&route_table_id),
                "SubnetId": intrinsic::reference(&subnet_id),
            }),
        )?;

        let default_route_id = match (config.subnet_type, gateway) {
            (SubnetType::Public, Some((igw, attachment))) => {
                let route = stack.add_resource(
                    &[id, name.as_str(), "DefaultRoute"],
                    ResourceType::Route,
                    json!({
                        "DestinationCidrBlock": ANY_IPV4,
                        "GatewayId": intrinsic::reference(igw),
                        "RouteTableId": intrinsic::reference(&route_table_id),
                    }),
                )?;
                stack.add_dependency(&route, attachment)?;
                Some(route)
            }
            _ => None,
        };

        debug!("Subnet {} ({}) {}", subnet_id, config.subnet_type.tag_value(), cidr);
        Ok(Subnet {
            logical_id: subnet_id,
            cidr,
            subnet_type: config.subnet_type,
            route_table_id,
            association_id,
            default_route_id,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn vpc_id(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    pub fn cidr(&self) -> &Ipv4Cidr {
        &self.cidr
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn public_subnets(&self) -> Vec<&Subnet> {
        self.subnets_of_type(SubnetType::Public)
    }

    pub fn isolated_subnets(&self) -> Vec<&Subnet> {
        self.subnets_of_type(SubnetType::PrivateIsolated)
    }

    fn subnets_of_type(&self, subnet_type: SubnetType) -> Vec<&Subnet> {
        self.subnets
            .iter()
            .filter(|subnet| subnet.subnet_type == subnet_type)
            .collect()
    }

    pub fn internet_gateway_id(&self) -> Option<&str> {
        self.internet_gateway_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Environment;
    use crate::SynthError;

    fn props(subnets: Vec<SubnetConfiguration>) -> VpcProps {
        VpcProps {
            cidr: Ipv4Cidr::new("10.10.10.0/24").unwrap(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            max_azs: 2,
            subnet_configuration: subnets,
        }
    }

    fn mask(value: u8) -> SubnetMask {
        SubnetMask::new(value).unwrap()
    }

    #[test]
    fn test_public_only_vpc() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let vpc = Vpc::new(&mut stack, "MyVPC", props(vec![SubnetConfiguration::public("Public", mask(27))])).unwrap();

        let cidrs: Vec<String> = vpc.public_subnets().iter().map(|s| s.cidr().to_string()).collect();
        assert_eq!(cidrs, vec!["10.10.10.0/27", "10.10.10.32/27"]);
        assert_eq!(vpc.internet_gateway_id(), Some("MyVPCIGW"));

        let template = stack.template();
        assert_eq!(template.resources_of_type(ResourceType::Subnet).len(), 2);
        assert_eq!(template.resources_of_type(ResourceType::Route).len(), 2);
        assert_eq!(template.resources_of_type(ResourceType::VpcGatewayAttachment).len(), 1);

        let subnet = stack.resource("MyVPCPublicSubnet1Subnet").unwrap();
        assert_eq!(subnet.properties["MapPublicIpOnLaunch"], json!(true));
        assert_eq!(
            subnet.properties["AvailabilityZone"],
            json!({ "Fn::Select": [0, { "Fn::GetAZs": "" }] })
        );

        let route = stack.resource("MyVPCPublicSubnet2DefaultRoute").unwrap();
        assert_eq!(route.properties["DestinationCidrBlock"], json!("0.0.0.0/0"));
        assert!(route.depends_on.contains("MyVPCVPCGW"));
        assert!(stack.synth().is_ok());
    }

    #[test]
    fn test_isolated_subnets_have_no_gateway() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let vpc = Vpc::new(&mut stack, "Vpc", props(vec![SubnetConfiguration::isolated("Data", mask(26))])).unwrap();

        assert!(vpc.internet_gateway_id().is_none());
        assert!(vpc.public_subnets().is_empty());
        assert_eq!(vpc.isolated_subnets().len(), 2);
        assert_eq!(vpc.isolated_subnets()[0].internet_connectivity(), vec!["VpcDataSubnet1RouteTableAssociation"]);
        assert!(stack.template().resources_of_type(ResourceType::Route).is_empty());
    }

    #[test]
    fn test_subnets_must_fit() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let result = Vpc::new(
            &mut stack,
            "Vpc",
            props(vec![
                SubnetConfiguration::public("Public", mask(25)),
                SubnetConfiguration::isolated("Data", mask(25)),
            ]),
        );
        assert!(matches!(result, Err(SynthError::Network(_))));
    }

    #[test]
    fn test_mask_wider_than_block() {
        let mut stack = Stack::new("TestStack", Environment::default()).unwrap();
        let result = Vpc::new(&mut stack, "Vpc", props(vec![SubnetConfiguration::public("Public", mask(20))]));
        assert!(matches!(result, Err(SynthError::Validation(_))));
    }
}
