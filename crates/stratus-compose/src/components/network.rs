//! Network partition and compute node.
//!
//! Declares the network with public and private-with-egress subnets across
//! the configured availability zones, an access-control group opening the
//! administrative port, and one compute node in the first public subnet.

use std::net::Ipv4Addr;

use serde_json::json;
use stratus_common::constants::{
    ADMIN_PORT, BOOT_DEVICE, BOOT_VOLUME_GIB, DEFAULT_ADMIN_CIDR, INSTANCE_TYPE, MACHINE_IMAGE,
    MAX_VOLUME_GIB, NETWORK_MAX_AZS, NETWORK_NAT_GATEWAYS,
};
use stratus_common::error::{Result, StratusError};

use super::Built;
use crate::handle::{ComputeHandle, NetworkHandle, Subnet, SubnetClass, VolumeSpec};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

const VPC_CIDR: &str = "10.0.0.0/16";
const AZ_SUFFIXES: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];

/// Builder for the network partition and its compute node.
#[derive(Debug, Clone)]
pub struct NetworkCompute {
    scope: Scope,
    key_name: Option<String>,
    admin_cidr: String,
    volume_gib: u32,
    instance_type: String,
}

impl NetworkCompute {
    /// Creates the component with the fixed topology parameters.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            key_name: None,
            admin_cidr: DEFAULT_ADMIN_CIDR.to_string(),
            volume_gib: BOOT_VOLUME_GIB,
            instance_type: INSTANCE_TYPE.to_string(),
        }
    }

    /// Sets the access-key name installed on the node.
    #[must_use]
    pub fn with_key_name(mut self, key_name: Option<String>) -> Self {
        self.key_name = key_name;
        self
    }

    /// Overrides the source range allowed on the administrative port.
    #[must_use]
    pub fn with_admin_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.admin_cidr = cidr.into();
        self
    }

    /// Overrides the boot volume size in GiB.
    #[must_use]
    pub const fn with_volume_size(mut self, gib: u32) -> Self {
        self.volume_gib = gib;
        self
    }

    /// Overrides the instance type.
    #[must_use]
    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    /// Declares the network and the compute node.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidSpec`] if the volume size, instance
    /// type, or administrative source range is invalid.
    pub fn build(&self) -> Result<Built<(NetworkHandle, ComputeHandle)>> {
        self.validate()?;
        let (network, mut resources) = self.declare_network();
        let (compute, compute_resources) = self.declare_compute(&network)?;
        resources.extend(compute_resources);
        tracing::info!(
            component = %self.scope.component(),
            network_id = %network.id(),
            instance_id = %compute.instance_id(),
            "network and compute declared"
        );
        Ok(Built::new((network, compute), resources))
    }

    /// Declares the network only, without a compute node.
    #[must_use]
    pub fn build_network(&self) -> Built<NetworkHandle> {
        let (network, resources) = self.declare_network();
        tracing::info!(
            component = %self.scope.component(),
            network_id = %network.id(),
            "network declared without compute node"
        );
        Built::new(network, resources)
    }

    fn validate(&self) -> Result<()> {
        let component = self.scope.component().as_str();
        if self.volume_gib == 0 || self.volume_gib > MAX_VOLUME_GIB {
            return Err(StratusError::invalid_spec(
                component,
                format!(
                    "boot volume size {} GiB is outside 1..={MAX_VOLUME_GIB}",
                    self.volume_gib
                ),
            ));
        }
        if !is_instance_type(&self.instance_type) {
            return Err(StratusError::invalid_spec(
                component,
                format!("instance type \"{}\" is not <family>.<size>", self.instance_type),
            ));
        }
        if !is_ipv4_cidr(&self.admin_cidr) {
            return Err(StratusError::invalid_spec(
                component,
                format!("administrative source range \"{}\" is not an IPv4 CIDR", self.admin_cidr),
            ));
        }
        Ok(())
    }

    fn declare_network(&self) -> (NetworkHandle, Vec<Resource>) {
        let scope = &self.scope;
        let vpc_logical = scope.logical_id("Vpc");
        let vpc_id = scope.resource_id("vpc", "Vpc");
        let mut resources = vec![Resource::new(
            vpc_logical.clone(),
            ResourceKind::Vpc,
            json!({
                "CidrBlock": VPC_CIDR,
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
                "InstanceTenancy": "default",
                "Tags": [{ "Key": "Name", "Value": format!("{}/Vpc", scope.stack_name()) }],
            }),
        )];

        let mut subnets = Vec::new();
        let mut nat_logical = None;
        for (class_index, class) in SubnetClass::ALL.into_iter().enumerate() {
            for az in 0..usize::from(NETWORK_MAX_AZS) {
                let index = class_index * usize::from(NETWORK_MAX_AZS) + az;
                let resource_name = format!("{class}Subnet{}", az + 1);
                let subnet = Subnet {
                    id: scope.resource_id("subnet", &resource_name),
                    logical_id: scope.logical_id(&resource_name),
                    class,
                    cidr: format!("10.0.{index}.0/24"),
                    availability_zone: format!(
                        "{}{}",
                        scope.region(),
                        AZ_SUFFIXES[az % AZ_SUFFIXES.len()]
                    ),
                };

                let mut resource = Resource::new(
                    subnet.logical_id.clone(),
                    ResourceKind::Subnet,
                    json!({
                        "VpcId": vpc_id,
                        "CidrBlock": subnet.cidr,
                        "AvailabilityZone": subnet.availability_zone,
                        "MapPublicIpOnLaunch": class == SubnetClass::Public,
                        "Tags": [{ "Key": "subnet-type", "Value": class.as_str() }],
                    }),
                )
                .depends_on(&vpc_logical);
                if let (SubnetClass::PrivateWithEgress, Some(nat)) = (class, &nat_logical) {
                    resource = resource.depends_on(nat);
                }
                resources.push(resource);
                subnets.push(subnet);
            }

            if class == SubnetClass::Public {
                let nats = self.declare_nat_gateways(&subnets);
                nat_logical = nats.first().map(|r| r.logical_id.clone());
                resources.extend(nats);
            }
        }

        let handle = NetworkHandle {
            id: vpc_id,
            logical_id: vpc_logical,
            subnets,
        };
        (handle, resources)
    }

    fn declare_nat_gateways(&self, public: &[Subnet]) -> Vec<Resource> {
        public
            .iter()
            .take(usize::from(NETWORK_NAT_GATEWAYS))
            .enumerate()
            .map(|(i, subnet)| {
                Resource::new(
                    self.scope.logical_id(&format!("NatGateway{}", i + 1)),
                    ResourceKind::NatGateway,
                    json!({
                        "SubnetId": subnet.id,
                        "ConnectivityType": "public",
                    }),
                )
                .depends_on(&subnet.logical_id)
            })
            .collect()
    }

    fn declare_compute(&self, network: &NetworkHandle) -> Result<(ComputeHandle, Vec<Resource>)> {
        let scope = &self.scope;
        let placement = network
            .subnets_of(SubnetClass::Public)
            .next()
            .ok_or_else(|| StratusError::dependency(scope.component().as_str(), "public subnet"))?;

        let sg_logical = scope.logical_id("InstanceSecurityGroup");
        let sg_id = scope.resource_id("sg", "InstanceSecurityGroup");
        let security_group = Resource::new(
            sg_logical.clone(),
            ResourceKind::SecurityGroup,
            json!({
                "GroupDescription": "Security group for EC2 instance",
                "VpcId": network.id(),
                "SecurityGroupEgress": [{
                    "CidrIp": "0.0.0.0/0",
                    "Description": "Allow all outbound traffic by default",
                    "IpProtocol": "-1",
                }],
                "SecurityGroupIngress": [{
                    "CidrIp": self.admin_cidr,
                    "Description": "SSH access from specific IP range",
                    "FromPort": ADMIN_PORT,
                    "IpProtocol": "tcp",
                    "ToPort": ADMIN_PORT,
                }],
            }),
        )
        .depends_on(network.logical_id());

        let volume = VolumeSpec {
            device: BOOT_DEVICE.to_string(),
            size_gib: self.volume_gib,
            encrypted: true,
        };
        let instance_logical = scope.logical_id("Instance");
        let instance_id = scope.resource_id("i", "Instance");
        let mut properties = json!({
            "InstanceType": self.instance_type,
            "ImageFamily": MACHINE_IMAGE,
            "SubnetId": placement.id,
            "AvailabilityZone": placement.availability_zone,
            "SecurityGroupIds": [sg_id],
            "BlockDeviceMappings": [{
                "DeviceName": volume.device,
                "Ebs": { "VolumeSize": volume.size_gib, "Encrypted": volume.encrypted },
            }],
        });
        if let (Some(key), Some(map)) = (&self.key_name, properties.as_object_mut()) {
            let _ = map.insert("KeyName".into(), json!(key));
        }
        let instance = Resource::new(instance_logical.clone(), ResourceKind::Instance, properties)
            .depends_on(&sg_logical)
            .depends_on(&placement.logical_id);

        let handle = ComputeHandle {
            instance_id,
            logical_id: instance_logical,
            security_group_id: sg_id,
            volume,
            key_name: self.key_name.clone(),
        };
        Ok((handle, vec![security_group, instance]))
    }
}

fn is_instance_type(value: &str) -> bool {
    let mut parts = value.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(family), Some(size), None) => {
            !family.is_empty()
                && !size.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        }
        _ => false,
    }
}

fn is_ipv4_cidr(value: &str) -> bool {
    let Some((addr, prefix)) = value.split_once('/') else {
        return false;
    };
    addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

#[cfg(test)]
mod tests {
    use stratus_common::config::StackSettings;
    use stratus_common::types::ComponentKind;

    use super::*;
    use crate::naming::Namer;

    fn component() -> NetworkCompute {
        NetworkCompute::new(Namer::new(&StackSettings::default()).scope(ComponentKind::NetworkCompute))
    }

    #[test]
    fn build_declares_both_subnet_classes() {
        let built = component().build().expect("build");
        let (network, _) = &built.handle;
        assert_eq!(
            network.classes(),
            vec![SubnetClass::Public, SubnetClass::PrivateWithEgress]
        );
        assert_eq!(network.subnets().len(), 4);
        assert!(network.id().as_str().starts_with("vpc-"));
    }

    #[test]
    fn compute_node_has_encrypted_fixed_volume() {
        let built = component().build().expect("build");
        let (_, compute) = &built.handle;
        assert_eq!(compute.volume().size_gib, 8);
        assert!(compute.volume().encrypted);
        assert_eq!(compute.volume().device, "/dev/xvda");
        assert!(compute.instance_id().as_str().starts_with("i-"));
    }

    #[test]
    fn instance_is_placed_in_public_subnet() {
        let built = component().build().expect("build");
        let (network, _) = &built.handle;
        let public = network
            .subnets_of(SubnetClass::Public)
            .next()
            .expect("public subnet");
        let instance = built
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::Instance)
            .expect("instance");
        assert_eq!(instance.properties["SubnetId"], public.id().as_str());
        assert_eq!(instance.properties["InstanceType"], "t2.micro");
    }

    #[test]
    fn security_group_opens_admin_port_to_configured_range() {
        let built = component()
            .with_admin_cidr("203.0.113.0/24")
            .build()
            .expect("build");
        let sg = built
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::SecurityGroup)
            .expect("security group");
        let rule = &sg.properties["SecurityGroupIngress"][0];
        assert_eq!(rule["FromPort"], 22);
        assert_eq!(rule["ToPort"], 22);
        assert_eq!(rule["IpProtocol"], "tcp");
        assert_eq!(rule["CidrIp"], "203.0.113.0/24");
    }

    #[test]
    fn default_admin_range_is_unrestricted() {
        let built = component().build().expect("build");
        let sg = built
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::SecurityGroup)
            .expect("security group");
        assert_eq!(sg.properties["SecurityGroupIngress"][0]["CidrIp"], "0.0.0.0/0");
    }

    #[test]
    fn key_name_is_optional() {
        let without = component().build().expect("build");
        let instance = without
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::Instance)
            .expect("instance");
        assert!(instance.property("KeyName").is_none());

        let with = component()
            .with_key_name(Some("my-key-pair".into()))
            .build()
            .expect("build");
        assert_eq!(with.handle.1.key_name(), Some("my-key-pair"));
    }

    #[test]
    fn zero_volume_is_invalid_spec() {
        let err = component().with_volume_size(0).build().expect_err("invalid");
        assert!(matches!(err, StratusError::InvalidSpec { .. }), "got: {err}");
    }

    #[test]
    fn malformed_instance_type_is_invalid_spec() {
        for bad in ["", "t2", "t2.", "T2.MICRO", "t2.micro.large"] {
            let err = component()
                .with_instance_type(bad)
                .build()
                .expect_err("invalid");
            assert!(matches!(err, StratusError::InvalidSpec { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn malformed_cidr_is_invalid_spec() {
        for bad in ["0.0.0.0", "10.0.0.0/33", "not-a-cidr/8"] {
            let err = component().with_admin_cidr(bad).build().expect_err("invalid");
            assert!(matches!(err, StratusError::InvalidSpec { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn resources_only_depend_on_earlier_resources() {
        let built = component().build().expect("build");
        let mut seen = std::collections::HashSet::new();
        for resource in &built.resources {
            for dep in &resource.depends_on {
                assert!(seen.contains(dep), "{} depends on later {dep}", resource.logical_id);
            }
            let _ = seen.insert(resource.logical_id.clone());
        }
    }

    #[test]
    fn network_only_build_has_no_instance() {
        let built = component().build_network();
        assert!(built.resources.iter().all(|r| r.kind != ResourceKind::Instance));
        assert_eq!(built.resources.iter().filter(|r| r.kind == ResourceKind::NatGateway).count(), 1);
    }
}
