//! Output of a composition pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use stratus_common::types::{ComponentKind, ResourceId};

use crate::handle::{
    AlarmBinding, BucketPair, ChannelIdentity, ComputeHandle, EndpointHandle, IdentityHandle,
    NetworkHandle, ZoneRecord,
};
use crate::manifest::Manifest;

/// A non-fatal condition observed while composing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Component that raised the diagnostic.
    pub component: ComponentKind,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic and logs it as a warning.
    #[must_use]
    pub fn warn(component: ComponentKind, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(component = %component, "{message}");
        Self { component, message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Identifiers of a component keyed by output name.
pub type Identifiers = BTreeMap<&'static str, ResourceId>;

/// Per-component entry of the identifier map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Slot {
    /// The component was instantiated.
    Realized {
        /// Final identifiers.
        identifiers: Identifiers,
    },
    /// The component's enabling precondition was not met.
    Absent {
        /// Why it was omitted.
        reason: String,
    },
}

impl Slot {
    /// Whether the component was instantiated.
    #[must_use]
    pub const fn is_realized(&self) -> bool {
        matches!(self, Self::Realized { .. })
    }

    /// Looks up one identifier of a realized component.
    #[must_use]
    pub fn identifier(&self, key: &str) -> Option<&ResourceId> {
        match self {
            Self::Realized { identifiers } => identifiers.get(key),
            Self::Absent { .. } => None,
        }
    }
}

/// Typed handles of every realized component.
#[derive(Debug, Clone, Serialize)]
pub struct Handles {
    /// Network partition.
    pub network: NetworkHandle,
    /// Compute node, when one was requested.
    pub compute: Option<ComputeHandle>,
    /// Buckets.
    pub buckets: BucketPair,
    /// User directory.
    pub identity: IdentityHandle,
    /// Load-distribution endpoint.
    pub endpoint: EndpointHandle,
    /// DNS zone and record, when a domain was supplied.
    pub zone: Option<ZoneRecord>,
    /// Alert channel.
    pub channel: ChannelIdentity,
    /// Utilization alarm, when a compute node exists.
    pub alarm: Option<AlarmBinding>,
}

/// Everything one composition pass produced.
#[derive(Debug, Clone)]
pub struct CompositionResult {
    pub(crate) order: Vec<ComponentKind>,
    pub(crate) slots: BTreeMap<ComponentKind, Slot>,
    pub(crate) handles: Handles,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) manifest: Manifest,
}

impl CompositionResult {
    /// Order in which components were evaluated.
    #[must_use]
    pub fn order(&self) -> &[ComponentKind] {
        &self.order
    }

    /// Identifier map keyed by component, with explicit absent entries.
    #[must_use]
    pub const fn slots(&self) -> &BTreeMap<ComponentKind, Slot> {
        &self.slots
    }

    /// Entry of a single component.
    #[must_use]
    pub fn slot(&self, kind: ComponentKind) -> Option<&Slot> {
        self.slots.get(&kind)
    }

    /// Typed handles.
    #[must_use]
    pub const fn handles(&self) -> &Handles {
        &self.handles
    }

    /// Non-fatal diagnostics in the order they were raised.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Synthesized manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Network partition ID.
    #[must_use]
    pub const fn network_id(&self) -> &ResourceId {
        self.handles.network.id()
    }

    /// Compute instance ID, absent when no compute node was requested.
    #[must_use]
    pub fn compute_instance_id(&self) -> Option<&ResourceId> {
        self.handles.compute.as_ref().map(ComputeHandle::instance_id)
    }

    /// User directory ID.
    #[must_use]
    pub const fn identity_directory_id(&self) -> &ResourceId {
        self.handles.identity.directory_id()
    }

    /// Primary bucket name.
    #[must_use]
    pub const fn primary_bucket_name(&self) -> &ResourceId {
        self.handles.buckets.primary().name()
    }

    /// Endpoint ARN.
    #[must_use]
    pub const fn endpoint_arn(&self) -> &ResourceId {
        self.handles.endpoint.arn()
    }

    /// Hosted zone and record, absent when no domain was supplied.
    #[must_use]
    pub const fn zone_record(&self) -> Option<&ZoneRecord> {
        self.handles.zone.as_ref()
    }

    /// Alarm name, absent when no compute node exists.
    #[must_use]
    pub fn alarm_name(&self) -> Option<&ResourceId> {
        self.handles.alarm.as_ref().map(AlarmBinding::alarm_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_slot_has_no_identifiers() {
        let slot = Slot::Absent {
            reason: "no domain".into(),
        };
        assert!(!slot.is_realized());
        assert!(slot.identifier("hostedZoneId").is_none());
    }

    #[test]
    fn realized_slot_serializes_with_status() {
        let mut identifiers = Identifiers::new();
        let _ = identifiers.insert("networkId", ResourceId::new("vpc-1"));
        let slot = Slot::Realized { identifiers };
        let json = serde_json::to_value(&slot).expect("serialize");
        assert_eq!(json["status"], "realized");
        assert_eq!(json["identifiers"]["networkId"], "vpc-1");
    }

    #[test]
    fn diagnostic_display_names_component() {
        let diag = Diagnostic::warn(ComponentKind::NameResolution, "skipped");
        assert_eq!(diag.to_string(), "[NameResolution] skipped");
    }
}
