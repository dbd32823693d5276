//! Internet-facing load-distribution endpoint.

use serde_json::json;
use stratus_common::constants::IDLE_TIMEOUT_SECS;
use stratus_common::error::{Result, StratusError};

use super::Built;
use crate::handle::{EndpointHandle, NetworkHandle, SubnetClass};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

/// Builder for the edge endpoint.
#[derive(Debug, Clone)]
pub struct EdgeBalancer {
    scope: Scope,
}

impl EdgeBalancer {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Declares the endpoint across the network's public subnets.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::Dependency`] if the network handle is absent
    /// or has no public subnets to attach to.
    pub fn build(&self, network: Option<&NetworkHandle>) -> Result<Built<EndpointHandle>> {
        let component = self.scope.component().as_str();
        let network = network.ok_or_else(|| StratusError::dependency(component, "NetworkHandle"))?;
        let public: Vec<_> = network.subnets_of(SubnetClass::Public).collect();
        if public.is_empty() {
            return Err(StratusError::dependency(component, "public subnet"));
        }

        let address = self.scope.address("LoadBalancer");
        let name = format!("{}-{}", component.to_ascii_lowercase(), &address[..8]);
        let logical_id = self.scope.logical_id("LoadBalancer");
        let arn = self.scope.arn(
            "elasticloadbalancing",
            &format!("loadbalancer/app/{name}/{}", &address[8..]),
        );
        let dns_name = format!("{name}-{}.{}.elb.amazonaws.com", &address[..10], self.scope.region());
        let canonical_zone_id = format!("Z{}", address[..13].to_ascii_uppercase());

        let mut resource = Resource::new(
            logical_id.clone(),
            ResourceKind::LoadBalancer,
            json!({
                "Name": name,
                "Type": "application",
                "Scheme": "internet-facing",
                "IpAddressType": "ipv4",
                "Subnets": public.iter().map(|s| s.id()).collect::<Vec<_>>(),
                "LoadBalancerAttributes": [
                    { "Key": "routing.http2.enabled", "Value": "true" },
                    { "Key": "idle_timeout.timeout_seconds", "Value": IDLE_TIMEOUT_SECS.to_string() },
                ],
            }),
        )
        .depends_on(network.logical_id());
        for subnet in &public {
            resource = resource.depends_on(subnet.logical_id());
        }

        tracing::info!(
            component = %self.scope.component(),
            network_id = %network.id(),
            arn = %arn,
            "edge endpoint declared"
        );

        let handle = EndpointHandle {
            arn,
            logical_id,
            dns_name,
            canonical_zone_id,
        };
        Ok(Built::new(handle, vec![resource]))
    }
}
