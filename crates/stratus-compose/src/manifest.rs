//! Declarative resource manifest.
//!
//! The manifest is the synthesized output handed to the external
//! provisioning executor. Resources are kept in declaration order and a
//! resource may only depend on resources declared before it, so the
//! manifest is dependency-ordered by construction.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use stratus_common::error::{Result, StratusError};
use stratus_common::types::LogicalId;

/// Resource types the composition engine declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Network partition.
    Vpc,
    /// Subnet within the network partition.
    Subnet,
    /// NAT gateway for private-with-egress subnets.
    NatGateway,
    /// Access-control group.
    SecurityGroup,
    /// Compute node.
    Instance,
    /// Object storage bucket.
    Bucket,
    /// User directory.
    UserPool,
    /// OAuth client.
    UserPoolClient,
    /// Directory hostname binding.
    UserPoolDomain,
    /// Load-distribution endpoint.
    LoadBalancer,
    /// Public DNS zone.
    HostedZone,
    /// DNS record.
    RecordSet,
    /// Notification channel.
    Topic,
    /// Metric alarm.
    Alarm,
}

impl ResourceKind {
    /// Provider type name written to the manifest.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::NatGateway => "AWS::EC2::NatGateway",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::Instance => "AWS::EC2::Instance",
            Self::Bucket => "AWS::S3::Bucket",
            Self::UserPool => "AWS::Cognito::UserPool",
            Self::UserPoolClient => "AWS::Cognito::UserPoolClient",
            Self::UserPoolDomain => "AWS::Cognito::UserPoolDomain",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::HostedZone => "AWS::Route53::HostedZone",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Topic => "AWS::SNS::Topic",
            Self::Alarm => "AWS::CloudWatch::Alarm",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single declared resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    /// Manifest-local name.
    pub logical_id: LogicalId,
    /// Resource type.
    pub kind: ResourceKind,
    /// Provider properties.
    pub properties: Value,
    /// Resources that must be realized first.
    pub depends_on: Vec<LogicalId>,
    /// Whether the resource survives teardown of the stack.
    pub retain: bool,
}

impl Resource {
    /// Creates a resource with no dependencies.
    #[must_use]
    pub fn new(logical_id: LogicalId, kind: ResourceKind, properties: Value) -> Self {
        Self {
            logical_id,
            kind,
            properties,
            depends_on: Vec::new(),
            retain: false,
        }
    }

    /// Adds a dependency edge to an earlier resource.
    #[must_use]
    pub fn depends_on(mut self, logical_id: &LogicalId) -> Self {
        if !self.depends_on.contains(logical_id) {
            self.depends_on.push(logical_id.clone());
        }
        self
    }

    /// Marks the resource as retained on teardown.
    #[must_use]
    pub const fn retained(mut self) -> Self {
        self.retain = true;
        self
    }

    /// Returns a property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Output serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Dependency-ordered collection of declared resources.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    description: String,
    resources: Vec<Resource>,
    declared: HashSet<LogicalId>,
    outputs: BTreeMap<String, String>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Declares a resource.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the logical ID is already declared
    /// and a dependency error if the resource depends on a logical ID that
    /// has not been declared yet.
    pub fn declare(&mut self, resource: Resource) -> Result<()> {
        if self.declared.contains(&resource.logical_id) {
            return Err(StratusError::config(format!(
                "duplicate logical id: \"{}\"",
                resource.logical_id
            )));
        }
        if let Some(missing) = resource
            .depends_on
            .iter()
            .find(|dep| !self.declared.contains(*dep))
        {
            return Err(StratusError::dependency(
                resource.logical_id.as_str(),
                missing.as_str(),
            ));
        }
        tracing::debug!(
            logical_id = %resource.logical_id,
            kind = %resource.kind,
            "declared resource"
        );
        let _ = self.declared.insert(resource.logical_id.clone());
        self.resources.push(resource);
        Ok(())
    }

    /// Records a named output value.
    pub fn add_output(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let _ = self.outputs.insert(key.into(), value.into());
    }

    /// Stack description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Looks up a resource by logical ID.
    #[must_use]
    pub fn get(&self, logical_id: &LogicalId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.logical_id == logical_id)
    }

    /// Resources of one type, in declaration order.
    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    /// Named outputs.
    #[must_use]
    pub const fn outputs(&self) -> &BTreeMap<String, String> {
        &self.outputs
    }

    /// Number of declared resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns whether no resources are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Renders the manifest as a template document.
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut resources = Map::new();
        for resource in &self.resources {
            let mut entry = Map::new();
            let _ = entry.insert("Type".into(), json!(resource.kind.type_name()));
            let _ = entry.insert("Properties".into(), resource.properties.clone());
            if !resource.depends_on.is_empty() {
                let _ = entry.insert("DependsOn".into(), json!(resource.depends_on));
            }
            if resource.retain {
                let _ = entry.insert("DeletionPolicy".into(), json!("Retain"));
                let _ = entry.insert("UpdateReplacePolicy".into(), json!("Retain"));
            }
            let _ = resources.insert(resource.logical_id.to_string(), Value::Object(entry));
        }

        let outputs: Map<String, Value> = self
            .outputs
            .iter()
            .map(|(k, v)| (k.clone(), json!({ "Value": v })))
            .collect();

        json!({
            "Description": self.description,
            "Resources": resources,
            "Outputs": outputs,
        })
    }

    /// Serializes the manifest in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: ManifestFormat) -> Result<String> {
        let document = self.to_document();
        match format {
            ManifestFormat::Json => Ok(serde_json::to_string_pretty(&document)?),
            ManifestFormat::Yaml => Ok(serde_yaml::to_string(&document)?),
        }
    }

    /// Writes the rendered manifest to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, path: &Path, format: ManifestFormat) -> Result<()> {
        let rendered = self.render(format)?;
        std::fs::write(path, rendered).map_err(|e| StratusError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), resources = self.len(), "manifest written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(id: &str) -> Resource {
        Resource::new(
            LogicalId::new(id),
            ResourceKind::Bucket,
            json!({ "BucketName": id.to_lowercase() }),
        )
    }

    #[test]
    fn declare_keeps_declaration_order() {
        let mut manifest = Manifest::new("test");
        manifest.declare(bucket("LogBucket")).expect("declare log");
        manifest
            .declare(bucket("Bucket").depends_on(&LogicalId::new("LogBucket")))
            .expect("declare primary");
        let ids: Vec<&str> = manifest
            .resources()
            .iter()
            .map(|r| r.logical_id.as_str())
            .collect();
        assert_eq!(ids, vec!["LogBucket", "Bucket"]);
    }

    #[test]
    fn declare_rejects_forward_reference() {
        let mut manifest = Manifest::new("test");
        let err = manifest
            .declare(bucket("Bucket").depends_on(&LogicalId::new("LogBucket")))
            .expect_err("should reject");
        assert!(matches!(err, StratusError::Dependency { .. }), "got: {err}");
        assert!(manifest.is_empty());
    }

    #[test]
    fn declare_rejects_duplicate_logical_id() {
        let mut manifest = Manifest::new("test");
        manifest.declare(bucket("Bucket")).expect("first");
        let err = manifest.declare(bucket("Bucket")).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn depends_on_ignores_repeated_edges() {
        let log = LogicalId::new("LogBucket");
        let resource = bucket("Bucket").depends_on(&log).depends_on(&log);
        assert_eq!(resource.depends_on, vec![log]);
    }

    #[test]
    fn document_carries_type_policy_and_outputs() {
        let mut manifest = Manifest::new("desc");
        manifest.declare(bucket("LogBucket").retained()).expect("declare");
        manifest.add_output("BucketName", "logbucket");
        let doc = manifest.to_document();
        assert_eq!(doc["Description"], "desc");
        assert_eq!(doc["Resources"]["LogBucket"]["Type"], "AWS::S3::Bucket");
        assert_eq!(doc["Resources"]["LogBucket"]["DeletionPolicy"], "Retain");
        assert!(doc["Resources"]["LogBucket"].get("DependsOn").is_none());
        assert_eq!(doc["Outputs"]["BucketName"]["Value"], "logbucket");
    }

    #[test]
    fn render_yaml_contains_type_names() {
        let mut manifest = Manifest::new("desc");
        manifest.declare(bucket("LogBucket")).expect("declare");
        let yaml = manifest.render(ManifestFormat::Yaml).expect("render");
        assert!(yaml.contains("AWS::S3::Bucket"), "got: {yaml}");
    }

    #[test]
    fn write_to_persists_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("manifest.json");
        let mut manifest = Manifest::new("desc");
        manifest.declare(bucket("LogBucket")).expect("declare");
        manifest
            .write_to(&path, ManifestFormat::Json)
            .expect("write");
        let content = std::fs::read_to_string(&path).expect("read");
        let doc: Value = serde_json::from_str(&content).expect("parse");
        assert_eq!(doc["Resources"]["LogBucket"]["Type"], "AWS::S3::Bucket");
    }

    #[test]
    fn resources_of_filters_by_kind() {
        let mut manifest = Manifest::new("desc");
        manifest.declare(bucket("A")).expect("a");
        manifest
            .declare(Resource::new(
                LogicalId::new("Topic"),
                ResourceKind::Topic,
                json!({}),
            ))
            .expect("topic");
        assert_eq!(manifest.resources_of(ResourceKind::Bucket).count(), 1);
        assert!(manifest.get(&LogicalId::new("Topic")).is_some());
    }
}
