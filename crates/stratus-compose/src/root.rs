//! The composition pass.
//!
//! Walks the static component graph in topological order, evaluates each
//! conditional predicate once at the point where its component would be
//! instantiated, threads handles from owners to dependents, and collects
//! every declared resource into a single manifest.

use std::collections::{BTreeMap, BTreeSet};

use stratus_common::config::{
    ConfigurationBundle, DomainBinding, DomainBindingRequest, StackSettings,
};
use stratus_common::constants::{AUTH_RECORD_LABEL, STACK_DESCRIPTION};
use stratus_common::error::{Result, StratusError};
use stratus_common::types::{ComponentKind, ResourceId};

use crate::components::{
    AlertChannel, Built, DomainName, EdgeBalancer, IdentityProvider, NameResolution,
    NetworkCompute, ObjectStore, Observability,
};
use crate::graph::DependencyGraph;
use crate::handle::{
    AlarmBinding, BucketPair, ChannelIdentity, ComputeHandle, EndpointHandle, IdentityHandle,
    NetworkHandle, ZoneRecord,
};
use crate::manifest::Manifest;
use crate::naming::{Namer, Scope};
use crate::result::{CompositionResult, Diagnostic, Handles, Identifiers, Slot};

/// Orchestrates one composition pass per call.
#[derive(Debug, Clone)]
pub struct CompositionRoot {
    settings: StackSettings,
    namer: Namer,
}

impl CompositionRoot {
    /// Creates a root for the given stack.
    #[must_use]
    pub fn new(settings: StackSettings) -> Self {
        let namer = Namer::new(&settings);
        Self { settings, namer }
    }

    /// Stack settings this root composes with.
    #[must_use]
    pub const fn settings(&self) -> &StackSettings {
        &self.settings
    }

    /// Runs a composition pass over `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::Configuration`] if the domain name (or a name
    /// derived from it) is invalid or a component unconditionally requires
    /// one that was omitted, [`StratusError::Dependency`] if a handle is
    /// missing when its dependent runs, and [`StratusError::InvalidSpec`] if
    /// the stack name or a component's low-level parameter is malformed.
    pub fn compose(&self, config: &ConfigurationBundle) -> Result<CompositionResult> {
        self.settings.validate()?;
        let config = config.clone().normalized();
        tracing::info!(
            stack = %self.settings.stack_name,
            domain = config.domain_name.as_deref().unwrap_or("-"),
            "starting composition pass"
        );

        let domain = config
            .domain_name
            .as_deref()
            .map(DomainName::parse)
            .transpose()
            .map_err(into_configuration)?;

        let graph = DependencyGraph::topology();
        let order = graph.resolve_order()?;

        let mut pass = Pass {
            root: self,
            config,
            domain,
            graph,
            realized: Realized::default(),
            slots: BTreeMap::new(),
            skipped: BTreeSet::new(),
            diagnostics: Vec::new(),
            manifest: Manifest::new(STACK_DESCRIPTION),
        };
        for &kind in &order {
            pass.check_dependencies(kind)?;
            pass.instantiate(kind)?;
        }
        pass.finish(order)
    }
}

/// Handles produced so far in the pass.
#[derive(Debug, Default)]
struct Realized {
    network: Option<NetworkHandle>,
    compute: Option<ComputeHandle>,
    buckets: Option<BucketPair>,
    identity: Option<IdentityHandle>,
    endpoint: Option<EndpointHandle>,
    zone: Option<ZoneRecord>,
    channel: Option<ChannelIdentity>,
    alarm: Option<AlarmBinding>,
}

struct Pass<'a> {
    root: &'a CompositionRoot,
    config: ConfigurationBundle,
    domain: Option<DomainName>,
    graph: DependencyGraph,
    realized: Realized,
    slots: BTreeMap<ComponentKind, Slot>,
    skipped: BTreeSet<ComponentKind>,
    diagnostics: Vec<Diagnostic>,
    manifest: Manifest,
}

impl Pass<'_> {
    fn check_dependencies(&self, kind: ComponentKind) -> Result<()> {
        for dep in self.graph.dependencies_of(kind) {
            if self.skipped.contains(&dep) {
                return Err(StratusError::config(format!(
                    "{kind} requires {dep}, which was omitted by configuration"
                )));
            }
            if !self.slots.contains_key(&dep) {
                return Err(StratusError::dependency(kind.as_str(), dep.as_str()));
            }
        }
        Ok(())
    }

    fn instantiate(&mut self, kind: ComponentKind) -> Result<()> {
        let scope = self.root.namer.scope(kind);
        match kind {
            ComponentKind::NetworkCompute => self.network_compute(scope),
            ComponentKind::ObjectStore => {
                let buckets = self.absorb(ObjectStore::new(scope).build())?;
                let mut ids = Identifiers::new();
                let _ = ids.insert("bucketName", buckets.primary().name().clone());
                let _ = ids.insert("logBucketName", buckets.log().name().clone());
                self.realized.buckets = Some(buckets);
                self.realize(kind, ids);
                Ok(())
            }
            ComponentKind::IdentityProvider => self.identity_provider(scope),
            ComponentKind::EdgeBalancer => {
                let built = EdgeBalancer::new(scope).build(self.realized.network.as_ref())?;
                let endpoint = self.absorb(built)?;
                let mut ids = Identifiers::new();
                let _ = ids.insert("loadBalancerArn", endpoint.arn().clone());
                let _ = ids.insert("dnsName", ResourceId::new(endpoint.dns_name()));
                self.realized.endpoint = Some(endpoint);
                self.realize(kind, ids);
                Ok(())
            }
            ComponentKind::NameResolution => self.name_resolution(scope),
            ComponentKind::AlertChannel => {
                let built = AlertChannel::new(scope).resolve(self.config.alert_channel_id.as_deref());
                let channel = self.absorb(built)?;
                let mut ids = Identifiers::new();
                let _ = ids.insert("topicArn", channel.arn().clone());
                self.realized.channel = Some(channel);
                self.realize(kind, ids);
                Ok(())
            }
            ComponentKind::Observability => self.observability(scope),
        }
    }

    fn network_compute(&mut self, scope: Scope) -> Result<()> {
        let kind = scope.component();
        let component = NetworkCompute::new(scope)
            .with_key_name(self.config.key_name.clone())
            .with_admin_cidr(self.root.settings.admin_ingress_cidr.as_str());
        let mut ids = Identifiers::new();
        if self.root.settings.compute_node {
            let (network, compute) = self.absorb(component.build()?)?;
            let _ = ids.insert("networkId", network.id().clone());
            let _ = ids.insert("instanceId", compute.instance_id().clone());
            let _ = ids.insert("securityGroupId", compute.security_group_id().clone());
            self.realized.network = Some(network);
            self.realized.compute = Some(compute);
        } else {
            let network = self.absorb(component.build_network())?;
            let _ = ids.insert("networkId", network.id().clone());
            self.realized.network = Some(network);
        }
        self.realize(kind, ids);
        Ok(())
    }

    fn identity_provider(&mut self, scope: Scope) -> Result<()> {
        let kind = scope.component();
        let binding = match self.config.domain_binding(AUTH_RECORD_LABEL) {
            DomainBindingRequest::Custom(requested) => Some(self.identity_binding(requested)?),
            DomainBindingRequest::Partial { missing } => {
                self.diagnostics.push(Diagnostic::warn(
                    kind,
                    format!(
                        "custom identity domain needs both a domain name and a certificate; \
                         {missing} missing, falling back to a generated domain"
                    ),
                ));
                None
            }
            DomainBindingRequest::None => None,
        };
        let identity = self.absorb(IdentityProvider::new(scope).build(binding.as_ref()))?;
        let mut ids = Identifiers::new();
        let _ = ids.insert("userPoolId", identity.directory_id().clone());
        let _ = ids.insert("clientId", identity.client_id().clone());
        let _ = ids.insert("domain", ResourceId::new(identity.domain().hostname()));
        self.realized.identity = Some(identity);
        self.realize(kind, ids);
        Ok(())
    }

    /// Rebinds the custom hostname to the validated domain name.
    fn identity_binding(&self, requested: DomainBinding) -> Result<DomainBinding> {
        let domain = self.domain.as_ref().ok_or_else(|| {
            StratusError::config("custom identity domain requested without a domain name")
        })?;
        let hostname = domain
            .subdomain(AUTH_RECORD_LABEL)
            .map_err(into_configuration)?;
        Ok(DomainBinding {
            hostname,
            ..requested
        })
    }

    fn name_resolution(&mut self, scope: Scope) -> Result<()> {
        let kind = scope.component();
        let Some(domain) = self.domain.clone() else {
            self.skip(kind, "Domain name not provided; skipping DNS setup.");
            return Ok(());
        };
        let endpoint = self
            .realized
            .endpoint
            .as_ref()
            .ok_or_else(|| StratusError::dependency(kind.as_str(), "EndpointHandle"))?;
        let built = NameResolution::new(scope)
            .build(domain.as_str(), endpoint)
            .map_err(into_configuration)?;
        let zone = self.absorb(built)?;
        let mut ids = Identifiers::new();
        let _ = ids.insert("hostedZoneId", zone.zone_id().clone());
        let _ = ids.insert("recordName", ResourceId::new(zone.record_name()));
        self.realized.zone = Some(zone);
        self.realize(kind, ids);
        Ok(())
    }

    fn observability(&mut self, scope: Scope) -> Result<()> {
        let kind = scope.component();
        let channel = self
            .realized
            .channel
            .as_ref()
            .ok_or_else(|| StratusError::dependency(kind.as_str(), "ChannelIdentity"))?;
        let built = Observability::new(scope).build(self.realized.compute.as_ref(), channel);
        match self.absorb(built)? {
            Some(alarm) => {
                let mut ids = Identifiers::new();
                let _ = ids.insert("alarmName", alarm.alarm_name().clone());
                self.realized.alarm = Some(alarm);
                self.realize(kind, ids);
            }
            None => self.mark_absent(kind, "no compute node to monitor"),
        }
        Ok(())
    }

    /// Declares a component's resources and keeps its diagnostics.
    fn absorb<H>(&mut self, built: Built<H>) -> Result<H> {
        for resource in built.resources {
            self.manifest.declare(resource)?;
        }
        self.diagnostics.extend(built.diagnostics);
        Ok(built.handle)
    }

    fn realize(&mut self, kind: ComponentKind, identifiers: Identifiers) {
        tracing::debug!(component = %kind, "component realized");
        let _ = self.slots.insert(kind, Slot::Realized { identifiers });
    }

    fn skip(&mut self, kind: ComponentKind, reason: &str) {
        self.diagnostics.push(Diagnostic::warn(kind, reason));
        self.mark_absent(kind, reason);
    }

    fn mark_absent(&mut self, kind: ComponentKind, reason: &str) {
        let _ = self.skipped.insert(kind);
        let _ = self.slots.insert(
            kind,
            Slot::Absent {
                reason: reason.to_string(),
            },
        );
    }

    fn finish(mut self, order: Vec<ComponentKind>) -> Result<CompositionResult> {
        for (kind, slot) in &self.slots {
            if let Slot::Realized { identifiers } = slot {
                for (key, id) in identifiers {
                    self.manifest
                        .add_output(format!("{kind}{}", capitalize(key)), id.as_str());
                }
            }
        }

        let missing = |name: &str| StratusError::dependency("CompositionRoot", name);
        let realized = self.realized;
        let handles = Handles {
            network: realized.network.ok_or_else(|| missing("NetworkHandle"))?,
            compute: realized.compute,
            buckets: realized.buckets.ok_or_else(|| missing("BucketPair"))?,
            identity: realized.identity.ok_or_else(|| missing("IdentityHandle"))?,
            endpoint: realized.endpoint.ok_or_else(|| missing("EndpointHandle"))?,
            zone: realized.zone,
            channel: realized.channel.ok_or_else(|| missing("ChannelIdentity"))?,
            alarm: realized.alarm,
        };

        tracing::info!(
            realized = self.slots.values().filter(|s| s.is_realized()).count(),
            skipped = self.skipped.len(),
            resources = self.manifest.len(),
            "composition pass complete"
        );

        Ok(CompositionResult {
            order,
            slots: self.slots,
            handles,
            diagnostics: self.diagnostics,
            manifest: self.manifest,
        })
    }
}

/// Domain validation failures surface as configuration errors.
fn into_configuration(err: StratusError) -> StratusError {
    match err {
        StratusError::InvalidDomain { domain, reason } => StratusError::config(format!(
            "invalid domain name \"{domain}\": {reason}"
        )),
        other => other,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> CompositionRoot {
        CompositionRoot::new(StackSettings::default())
    }

    #[test]
    fn empty_bundle_composes_in_degraded_mode() {
        let result = root()
            .compose(&ConfigurationBundle::default())
            .expect("compose");
        assert!(result.zone_record().is_none());
        assert!(result.alarm_name().is_some());
        assert!(result.handles().channel.is_created());
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].component, ComponentKind::NameResolution);
    }

    #[test]
    fn every_component_has_a_slot() {
        let result = root()
            .compose(&ConfigurationBundle::default())
            .expect("compose");
        for kind in ComponentKind::ALL {
            assert!(result.slot(kind).is_some(), "{kind} has no slot");
        }
        assert!(!result
            .slot(ComponentKind::NameResolution)
            .expect("slot")
            .is_realized());
    }

    #[test]
    fn invalid_domain_is_configuration_error() {
        let config = ConfigurationBundle {
            domain_name: Some("bad_domain".into()),
            ..ConfigurationBundle::default()
        };
        let err = root().compose(&config).expect_err("should fail");
        assert!(matches!(err, StratusError::Configuration { .. }), "got: {err}");
        assert!(err.to_string().contains("bad_domain"), "got: {err}");
    }

    #[test]
    fn partial_domain_binding_warns_and_falls_back() {
        let config = ConfigurationBundle {
            certificate_id: Some("arn:aws:acm:us-east-1:123456789012:certificate/abc".into()),
            ..ConfigurationBundle::default()
        };
        let result = root().compose(&config).expect("compose");
        assert!(!result.handles().identity.domain().is_custom());
        assert!(result
            .diagnostics()
            .iter()
            .any(|d| d.component == ComponentKind::IdentityProvider));
    }

    #[test]
    fn disabled_compute_node_skips_alarm() {
        let settings = StackSettings {
            compute_node: false,
            ..StackSettings::default()
        };
        let result = CompositionRoot::new(settings)
            .compose(&ConfigurationBundle::default())
            .expect("compose");
        assert!(result.compute_instance_id().is_none());
        assert!(result.alarm_name().is_none());
        assert!(result
            .slot(ComponentKind::NetworkCompute)
            .expect("slot")
            .is_realized());
        assert!(!result
            .slot(ComponentKind::Observability)
            .expect("slot")
            .is_realized());
    }

    #[test]
    fn identity_hostname_uses_normalized_domain() {
        let config = ConfigurationBundle {
            domain_name: Some("Example.COM.".into()),
            certificate_id: Some("arn:aws:acm:us-east-1:123456789012:certificate/abc".into()),
            ..ConfigurationBundle::default()
        };
        let result = root().compose(&config).expect("compose");
        let identity = result.handles().identity.domain();
        assert!(identity.is_custom());
        assert_eq!(identity.hostname(), "auth.example.com");
        assert_eq!(
            result.zone_record().expect("zone").zone_name(),
            "example.com."
        );
    }

    #[test]
    fn identity_hostname_over_length_limit_is_configuration_error() {
        let config = ConfigurationBundle {
            domain_name: Some(format!("{}.com", vec!["a".repeat(61); 4].join("."))),
            certificate_id: Some("arn:aws:acm:us-east-1:123456789012:certificate/abc".into()),
            ..ConfigurationBundle::default()
        };
        let err = root().compose(&config).expect_err("should fail");
        assert!(matches!(err, StratusError::Configuration { .. }), "got: {err}");
    }

    #[test]
    fn malformed_stack_name_is_invalid_spec() {
        for bad in ["", "my stack/x", "stack:1"] {
            let settings = StackSettings {
                stack_name: bad.into(),
                ..StackSettings::default()
            };
            let err = CompositionRoot::new(settings)
                .compose(&ConfigurationBundle::default())
                .expect_err(bad);
            assert!(matches!(err, StratusError::InvalidSpec { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn invalid_admin_cidr_is_invalid_spec() {
        let settings = StackSettings {
            admin_ingress_cidr: "everywhere".into(),
            ..StackSettings::default()
        };
        let err = CompositionRoot::new(settings)
            .compose(&ConfigurationBundle::default())
            .expect_err("should fail");
        assert!(matches!(err, StratusError::InvalidSpec { .. }), "got: {err}");
    }

    #[test]
    fn outputs_mirror_realized_identifiers() {
        let result = root()
            .compose(&ConfigurationBundle::default())
            .expect("compose");
        let outputs = result.manifest().outputs();
        assert_eq!(
            outputs.get("NetworkComputeNetworkId").map(String::as_str),
            Some(result.network_id().as_str())
        );
        assert_eq!(
            outputs.get("ObjectStoreBucketName").map(String::as_str),
            Some(result.primary_bucket_name().as_str())
        );
        assert!(!outputs.keys().any(|k| k.starts_with("NameResolution")));
    }

    #[test]
    fn capitalize_handles_empty_and_ascii() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("networkId"), "NetworkId");
    }
}
