//! Read-only handles passed from owning components to their dependents.
//!
//! Every handle is created once by the component that owns it and is
//! immutable afterwards: fields are private and exposed through accessors.

use std::fmt;

use serde::{Deserialize, Serialize};
use stratus_common::types::{LogicalId, ResourceId};

/// Subnet classification inside the network partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubnetClass {
    /// Routable from the internet.
    Public,
    /// Outbound-only through a NAT gateway.
    PrivateWithEgress,
}

impl SubnetClass {
    /// Both classes in creation order.
    pub const ALL: [Self; 2] = [Self::Public, Self::PrivateWithEgress];

    /// Name used in logical IDs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::PrivateWithEgress => "Private",
        }
    }
}

impl fmt::Display for SubnetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subnet of the network partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subnet {
    pub(crate) id: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) class: SubnetClass,
    pub(crate) cidr: String,
    pub(crate) availability_zone: String,
}

impl Subnet {
    /// Subnet ID.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Subnet classification.
    #[must_use]
    pub const fn class(&self) -> SubnetClass {
        self.class
    }

    /// Address range.
    #[must_use]
    pub fn cidr(&self) -> &str {
        &self.cidr
    }

    /// Availability zone the subnet lives in.
    #[must_use]
    pub fn availability_zone(&self) -> &str {
        &self.availability_zone
    }
}

/// Network partition produced by `NetworkCompute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkHandle {
    pub(crate) id: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) subnets: Vec<Subnet>,
}

impl NetworkHandle {
    /// Network partition ID.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// All subnets.
    #[must_use]
    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    /// Subnets of one classification.
    pub fn subnets_of(&self, class: SubnetClass) -> impl Iterator<Item = &Subnet> {
        self.subnets.iter().filter(move |s| s.class == class)
    }

    /// Subnet classifications present in this network.
    #[must_use]
    pub fn classes(&self) -> Vec<SubnetClass> {
        SubnetClass::ALL
            .into_iter()
            .filter(|&c| self.subnets_of(c).next().is_some())
            .collect()
    }
}

/// Storage volume attached to the compute node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Device name, e.g. `/dev/xvda`.
    pub device: String,
    /// Size in GiB.
    pub size_gib: u32,
    /// Whether the volume is encrypted at rest.
    pub encrypted: bool,
}

/// Compute node produced by `NetworkCompute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeHandle {
    pub(crate) instance_id: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) security_group_id: ResourceId,
    pub(crate) volume: VolumeSpec,
    pub(crate) key_name: Option<String>,
}

impl ComputeHandle {
    /// Compute instance ID.
    #[must_use]
    pub const fn instance_id(&self) -> &ResourceId {
        &self.instance_id
    }

    /// Manifest logical ID of the instance.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Access-control group ID.
    #[must_use]
    pub const fn security_group_id(&self) -> &ResourceId {
        &self.security_group_id
    }

    /// Boot volume descriptor.
    #[must_use]
    pub const fn volume(&self) -> &VolumeSpec {
        &self.volume
    }

    /// Access-key name installed on the node, if any.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }
}

/// Load-distribution endpoint produced by `EdgeBalancer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointHandle {
    pub(crate) arn: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) dns_name: String,
    pub(crate) canonical_zone_id: String,
}

impl EndpointHandle {
    /// ARN of the endpoint.
    #[must_use]
    pub const fn arn(&self) -> &ResourceId {
        &self.arn
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Public DNS name of the endpoint.
    #[must_use]
    pub fn dns_name(&self) -> &str {
        &self.dns_name
    }

    /// Hosted zone that owns the endpoint's DNS name, used by alias records.
    #[must_use]
    pub fn canonical_zone_id(&self) -> &str {
        &self.canonical_zone_id
    }
}

/// Notification channel resolved by `AlertChannel`.
///
/// Exactly one of created or referenced, by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ChannelIdentity {
    /// A channel declared by this composition.
    Created {
        /// ARN of the new channel.
        arn: ResourceId,
        /// Manifest logical ID.
        logical_id: LogicalId,
        /// Display label.
        display_name: String,
    },
    /// A caller-supplied channel passed through untouched.
    Referenced {
        /// ARN supplied by the caller.
        arn: ResourceId,
    },
}

impl ChannelIdentity {
    /// ARN of the channel, whichever way it was resolved.
    #[must_use]
    pub const fn arn(&self) -> &ResourceId {
        match self {
            Self::Created { arn, .. } | Self::Referenced { arn } => arn,
        }
    }

    /// Whether this composition declared the channel.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// Whether the channel was supplied by the caller.
    #[must_use]
    pub const fn is_referenced(&self) -> bool {
        matches!(self, Self::Referenced { .. })
    }

    /// Manifest logical ID when the channel was created here.
    #[must_use]
    pub const fn logical_id(&self) -> Option<&LogicalId> {
        match self {
            Self::Created { logical_id, .. } => Some(logical_id),
            Self::Referenced { .. } => None,
        }
    }

    /// Whether alarm actions can target this channel: the identifier must
    /// be an ARN in the notification service.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        let arn = self.arn().as_str();
        arn.starts_with("arn:") && arn.split(':').nth(2) == Some("sns")
    }
}

/// Hosted zone and alias record produced by `NameResolution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRecord {
    pub(crate) zone_id: ResourceId,
    pub(crate) zone_logical_id: LogicalId,
    pub(crate) zone_name: String,
    pub(crate) record_name: String,
    pub(crate) record_type: String,
    pub(crate) ttl_secs: u32,
    pub(crate) target: ResourceId,
}

impl ZoneRecord {
    /// Hosted zone ID.
    #[must_use]
    pub const fn zone_id(&self) -> &ResourceId {
        &self.zone_id
    }

    /// Manifest logical ID of the hosted zone.
    #[must_use]
    pub const fn zone_logical_id(&self) -> &LogicalId {
        &self.zone_logical_id
    }

    /// Fully qualified zone name, e.g. `example.com.`.
    #[must_use]
    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    /// Fully qualified record name, e.g. `api.example.com.`.
    #[must_use]
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Record type.
    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Cache lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> u32 {
        self.ttl_secs
    }

    /// Endpoint the alias points at.
    #[must_use]
    pub const fn target(&self) -> &ResourceId {
        &self.target
    }
}

/// The audit bucket that receives access logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogBucket {
    pub(crate) name: ResourceId,
    pub(crate) logical_id: LogicalId,
}

impl LogBucket {
    /// Bucket name.
    #[must_use]
    pub const fn name(&self) -> &ResourceId {
        &self.name
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
}

/// The primary content bucket. Its log target is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBucket {
    pub(crate) name: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) log_target: ResourceId,
    pub(crate) versioned: bool,
}

impl ContentBucket {
    /// Bucket name.
    #[must_use]
    pub const fn name(&self) -> &ResourceId {
        &self.name
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Name of the bucket receiving this bucket's access logs.
    #[must_use]
    pub const fn log_target(&self) -> &ResourceId {
        &self.log_target
    }

    /// Whether object versioning is on.
    #[must_use]
    pub const fn versioned(&self) -> bool {
        self.versioned
    }
}

/// Primary bucket plus its log bucket, produced by `ObjectStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPair {
    pub(crate) primary: ContentBucket,
    pub(crate) log: LogBucket,
}

impl BucketPair {
    /// The primary content bucket.
    #[must_use]
    pub const fn primary(&self) -> &ContentBucket {
        &self.primary
    }

    /// The log bucket.
    #[must_use]
    pub const fn log(&self) -> &LogBucket {
        &self.log
    }
}

/// How the identity provider's hostname was bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityDomain {
    /// Caller-supplied hostname served with the caller's certificate.
    Custom {
        /// Hostname, e.g. `auth.example.com`.
        hostname: String,
        /// Certificate identifier.
        certificate_id: String,
    },
    /// Hostname generated from the component identity.
    Generated {
        /// Unique domain prefix.
        prefix: String,
        /// Resulting hostname.
        hostname: String,
    },
}

impl IdentityDomain {
    /// The hostname, whichever way it was bound.
    #[must_use]
    pub fn hostname(&self) -> &str {
        match self {
            Self::Custom { hostname, .. } | Self::Generated { hostname, .. } => hostname,
        }
    }

    /// Whether the caller's certificate is used.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

/// User directory and client produced by `IdentityProvider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityHandle {
    pub(crate) directory_id: ResourceId,
    pub(crate) directory_logical_id: LogicalId,
    pub(crate) client_id: ResourceId,
    pub(crate) domain: IdentityDomain,
}

impl IdentityHandle {
    /// User directory ID.
    #[must_use]
    pub const fn directory_id(&self) -> &ResourceId {
        &self.directory_id
    }

    /// Manifest logical ID of the directory.
    #[must_use]
    pub const fn directory_logical_id(&self) -> &LogicalId {
        &self.directory_logical_id
    }

    /// OAuth client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ResourceId {
        &self.client_id
    }

    /// Hostname binding.
    #[must_use]
    pub const fn domain(&self) -> &IdentityDomain {
        &self.domain
    }
}

/// Comparison applied between the metric and the alarm threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Metric < threshold.
    LessThanThreshold,
    /// Metric <= threshold.
    LessThanOrEqualToThreshold,
    /// Metric > threshold.
    GreaterThanThreshold,
    /// Metric >= threshold.
    GreaterThanOrEqualToThreshold,
}

impl ComparisonOperator {
    /// Manifest representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LessThanThreshold => "LessThanThreshold",
            Self::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
            Self::GreaterThanThreshold => "GreaterThanThreshold",
            Self::GreaterThanOrEqualToThreshold => "GreaterThanOrEqualToThreshold",
        }
    }
}

/// Alarm produced by `Observability`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmBinding {
    pub(crate) alarm_name: ResourceId,
    pub(crate) logical_id: LogicalId,
    pub(crate) namespace: String,
    pub(crate) metric_name: String,
    pub(crate) instance_id: ResourceId,
    pub(crate) period_secs: u32,
    pub(crate) evaluation_periods: u32,
    pub(crate) threshold: f64,
    pub(crate) comparison: ComparisonOperator,
    pub(crate) actions_enabled: bool,
    pub(crate) actions: Vec<ResourceId>,
}

impl AlarmBinding {
    /// Alarm name.
    #[must_use]
    pub const fn alarm_name(&self) -> &ResourceId {
        &self.alarm_name
    }

    /// Manifest logical ID.
    #[must_use]
    pub const fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Metric namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Metric name.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Monitored instance.
    #[must_use]
    pub const fn instance_id(&self) -> &ResourceId {
        &self.instance_id
    }

    /// Sampling period in seconds.
    #[must_use]
    pub const fn period_secs(&self) -> u32 {
        self.period_secs
    }

    /// Consecutive periods before the alarm fires.
    #[must_use]
    pub const fn evaluation_periods(&self) -> u32 {
        self.evaluation_periods
    }

    /// Threshold value.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Comparison operator.
    #[must_use]
    pub const fn comparison(&self) -> ComparisonOperator {
        self.comparison
    }

    /// Whether alarm actions fire.
    #[must_use]
    pub const fn actions_enabled(&self) -> bool {
        self.actions_enabled
    }

    /// Notification targets.
    #[must_use]
    pub fn actions(&self) -> &[ResourceId] {
        &self.actions
    }
}
