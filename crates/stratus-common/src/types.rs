//! Domain primitive types used across the Stratus workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, externally consumable identifier of a synthesized resource
/// (resource id, name, or ARN).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a resource ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Manifest-local name of a declared resource, used for `depends_on` edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Creates a logical ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The infrastructure components a composition pass can realize.
///
/// Ordering follows declaration order, which is also the leaf-first order
/// used when the graph has no edge between two components.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ComponentKind {
    /// Network partition and compute node.
    NetworkCompute,
    /// Content bucket and its log bucket.
    ObjectStore,
    /// User directory and OAuth client.
    IdentityProvider,
    /// Internet-facing load-distribution endpoint.
    EdgeBalancer,
    /// Public hosted zone and alias record.
    NameResolution,
    /// Notification channel.
    AlertChannel,
    /// Utilization alarm.
    Observability,
}

impl ComponentKind {
    /// All components in leaf-first declaration order.
    pub const ALL: [Self; 7] = [
        Self::NetworkCompute,
        Self::ObjectStore,
        Self::IdentityProvider,
        Self::EdgeBalancer,
        Self::NameResolution,
        Self::AlertChannel,
        Self::Observability,
    ];

    /// Returns the component name used in identifiers and output keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkCompute => "NetworkCompute",
            Self::ObjectStore => "ObjectStore",
            Self::IdentityProvider => "IdentityProvider",
            Self::EdgeBalancer => "EdgeBalancer",
            Self::NameResolution => "NameResolution",
            Self::AlertChannel => "AlertChannel",
            Self::Observability => "Observability",
        }
    }

    /// Components that must be realized before this one.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Self] {
        match self {
            Self::NetworkCompute | Self::ObjectStore | Self::IdentityProvider => &[],
            Self::AlertChannel => &[],
            Self::EdgeBalancer => &[Self::NetworkCompute],
            Self::NameResolution => &[Self::EdgeBalancer],
            Self::Observability => &[Self::NetworkCompute, Self::AlertChannel],
        }
    }

    /// Whether a configuration predicate can omit this component.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::NameResolution | Self::Observability)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_serializes_as_plain_string() {
        let id = ResourceId::new("vpc-0123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"vpc-0123\"");
    }

    #[test]
    fn component_names_are_unique() {
        let mut names: Vec<&str> = ComponentKind::ALL.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ComponentKind::ALL.len());
    }

    #[test]
    fn dependencies_precede_dependents_in_declaration_order() {
        for kind in ComponentKind::ALL {
            for dep in kind.dependencies() {
                assert!(dep < &kind, "{dep} should be declared before {kind}");
            }
        }
    }

    #[test]
    fn only_dns_and_alarm_are_conditional() {
        let conditional: Vec<ComponentKind> = ComponentKind::ALL
            .into_iter()
            .filter(|c| c.is_conditional())
            .collect();
        assert_eq!(
            conditional,
            vec![ComponentKind::NameResolution, ComponentKind::Observability]
        );
    }
}
