//! Public hosted zone and alias record for the edge endpoint.

use std::fmt;

use serde_json::json;
use stratus_common::constants::{API_RECORD_LABEL, RECORD_TTL_SECS};
use stratus_common::error::{Result, StratusError};
use stratus_common::types::ResourceId;

use super::Built;
use crate::handle::{EndpointHandle, ZoneRecord};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

/// Maximum length of a domain name, excluding the trailing dot.
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum length of a single label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// A syntactically valid, lowercase public domain name without trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    /// Validates and normalizes a domain name.
    ///
    /// A single trailing dot is accepted and dropped. The name must have at
    /// least two labels, each 1 to 63 characters of ASCII letters, digits,
    /// or hyphens, not starting or ending with a hyphen. The top-level
    /// label may not be all digits.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidDomain`] describing the first violation.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| StratusError::InvalidDomain {
            domain: input.to_string(),
            reason,
        };

        let name = input.strip_suffix('.').unwrap_or(input).to_ascii_lowercase();
        if name.is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if name.len() > MAX_DOMAIN_LENGTH {
            return Err(invalid(format!(
                "name is {} characters, limit is {MAX_DOMAIN_LENGTH}",
                name.len()
            )));
        }

        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() < 2 {
            return Err(invalid("a public zone needs at least two labels".into()));
        }
        for label in &labels {
            if label.is_empty() {
                return Err(invalid("empty label".into()));
            }
            if label.len() > MAX_LABEL_LENGTH {
                return Err(invalid(format!(
                    "label \"{label}\" exceeds {MAX_LABEL_LENGTH} characters"
                )));
            }
            if let Some(c) = label
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
            {
                return Err(invalid(format!("invalid character '{c}'")));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(invalid(format!(
                    "label \"{label}\" starts or ends with a hyphen"
                )));
            }
        }
        if labels
            .last()
            .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(invalid("top-level label is all digits".into()));
        }

        Ok(Self(name))
    }

    /// The name without trailing dot.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified form with trailing dot.
    #[must_use]
    pub fn fqdn(&self) -> String {
        format!("{}.", self.0)
    }

    /// Name of `label` directly under this domain, without trailing dot.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidDomain`] if the result exceeds
    /// [`MAX_DOMAIN_LENGTH`].
    pub fn subdomain(&self, label: &str) -> Result<String> {
        let name = format!("{label}.{}", self.0);
        if name.len() > MAX_DOMAIN_LENGTH {
            return Err(StratusError::InvalidDomain {
                domain: self.0.clone(),
                reason: format!(
                    "subdomain \"{label}\" would be {} characters, limit is {MAX_DOMAIN_LENGTH}",
                    name.len()
                ),
            });
        }
        Ok(name)
    }

    /// Fully qualified name of `label` directly under this domain.
    #[must_use]
    pub fn subdomain_fqdn(&self, label: &str) -> String {
        format!("{label}.{}.", self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder for the hosted zone and alias record.
#[derive(Debug, Clone)]
pub struct NameResolution {
    scope: Scope,
}

impl NameResolution {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Declares a public hosted zone for `domain_name` and an `A` alias
    /// record under the `api` label pointing at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidDomain`] if `domain_name` is not a
    /// valid domain name.
    pub fn build(&self, domain_name: &str, endpoint: &EndpointHandle) -> Result<Built<ZoneRecord>> {
        let domain = DomainName::parse(domain_name)?;
        let scope = &self.scope;

        let zone_logical = scope.logical_id("HostedZone");
        let zone_id = ResourceId::new(format!(
            "Z{}",
            scope.address("HostedZone")[..13].to_ascii_uppercase()
        ));
        let zone = Resource::new(
            zone_logical.clone(),
            ResourceKind::HostedZone,
            json!({
                "Name": domain.fqdn(),
                "HostedZoneConfig": { "Comment": "Hosted zone for ALB routing" },
            }),
        );

        let record_name = domain.subdomain_fqdn(API_RECORD_LABEL);
        let record = Resource::new(
            scope.logical_id("AliasRecord"),
            ResourceKind::RecordSet,
            json!({
                "HostedZoneId": zone_id,
                "Name": record_name,
                "Type": "A",
                "TTL": RECORD_TTL_SECS.to_string(),
                "Comment": "Alias record for ALB",
                "AliasTarget": {
                    "DNSName": format!("dualstack.{}", endpoint.dns_name()),
                    "HostedZoneId": endpoint.canonical_zone_id(),
                },
            }),
        )
        .depends_on(&zone_logical)
        .depends_on(endpoint.logical_id());

        tracing::info!(
            component = %scope.component(),
            zone = %domain.fqdn(),
            record = %record_name,
            target = %endpoint.arn(),
            "hosted zone declared"
        );

        let handle = ZoneRecord {
            zone_id,
            zone_logical_id: zone_logical,
            zone_name: domain.fqdn(),
            record_name,
            record_type: "A".to_string(),
            ttl_secs: RECORD_TTL_SECS,
            target: endpoint.arn().clone(),
        };
        Ok(Built::new(handle, vec![zone, record]))
    }
}

#[cfg(test)]
mod tests {
    use stratus_common::config::StackSettings;
    use stratus_common::types::{ComponentKind, LogicalId};

    use super::*;
    use crate::naming::Namer;

    fn endpoint() -> EndpointHandle {
        EndpointHandle {
            arn: ResourceId::new(
                "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/edge/abc",
            ),
            logical_id: LogicalId::new("EdgeBalancerLoadBalancer"),
            dns_name: "edge-abc.us-east-1.elb.amazonaws.com".into(),
            canonical_zone_id: "Z35SXDOTRQ7X7K".into(),
        }
    }

    fn component() -> NameResolution {
        NameResolution::new(Namer::new(&StackSettings::default()).scope(ComponentKind::NameResolution))
    }

    #[test]
    fn parse_accepts_common_names() {
        for ok in ["example.com", "Example.COM.", "a-b.example.co.uk", "xn--bcher-kva.example"] {
            assert!(DomainName::parse(ok).is_ok(), "{ok} should parse");
        }
        assert_eq!(
            DomainName::parse("Example.COM.").expect("parse").as_str(),
            "example.com"
        );
    }

    #[test]
    fn parse_rejects_malformed_names() {
        let long_label = format!("{}.com", "a".repeat(64));
        let long_name = format!("{}.com", ["abcdefghij"; 25].join("."));
        for bad in [
            "",
            ".",
            "localhost",
            "example..com",
            "-example.com",
            "example-.com",
            "exa mple.com",
            "example.123",
            "under_score.com",
            long_label.as_str(),
            long_name.as_str(),
        ] {
            let err = DomainName::parse(bad).expect_err(bad);
            assert!(matches!(err, StratusError::InvalidDomain { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn subdomain_is_normalized_and_length_checked() {
        let domain = DomainName::parse("Example.COM.").expect("parse");
        assert_eq!(domain.subdomain("auth").expect("fits"), "auth.example.com");

        let long = format!("{}.com", vec!["a".repeat(61); 4].join("."));
        let domain = DomainName::parse(&long).expect("parse");
        let err = domain.subdomain("auth").expect_err("too long");
        assert!(matches!(err, StratusError::InvalidDomain { .. }), "got: {err}");
    }

    #[test]
    fn record_is_api_label_with_fixed_ttl() {
        let built = component().build("example.com", &endpoint()).expect("build");
        let zone = &built.handle;
        assert_eq!(zone.zone_name(), "example.com.");
        assert_eq!(zone.record_name(), "api.example.com.");
        assert_eq!(zone.record_type(), "A");
        assert_eq!(zone.ttl_secs(), 300);
        assert_eq!(zone.target(), endpoint().arn());
    }

    #[test]
    fn record_resource_aliases_endpoint() {
        let built = component().build("example.com", &endpoint()).expect("build");
        let record = &built.resources[1];
        assert_eq!(record.properties["TTL"], "300");
        assert_eq!(record.properties["Type"], "A");
        assert_eq!(record.properties["AliasTarget"]["HostedZoneId"], "Z35SXDOTRQ7X7K");
        assert!(record.depends_on.contains(&LogicalId::new("EdgeBalancerLoadBalancer")));
        assert!(record.depends_on.contains(built.handle.zone_logical_id()));
    }

    #[test]
    fn invalid_domain_fails_without_resources() {
        let err = component()
            .build("not a domain", &endpoint())
            .expect_err("invalid");
        assert!(matches!(err, StratusError::InvalidDomain { .. }), "got: {err}");
    }
}
