//! Content bucket with a companion access-log bucket.

use serde_json::{Value, json};
use stratus_common::constants::ACCESS_LOG_PREFIX;
use stratus_common::types::ResourceId;

use super::Built;
use crate::handle::{BucketPair, ContentBucket, LogBucket};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

/// Builder for the bucket pair.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    scope: Scope,
}

impl ObjectStore {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Declares the log bucket, then the primary bucket logging into it.
    #[must_use]
    pub fn build(&self) -> Built<BucketPair> {
        let (log, log_resource) = self.declare_log_bucket();
        let (primary, primary_resource) = self.declare_primary_bucket(&log);
        tracing::info!(
            component = %self.scope.component(),
            bucket = %primary.name(),
            log_bucket = %log.name(),
            "buckets declared"
        );
        Built::new(
            BucketPair { primary, log },
            vec![log_resource, primary_resource],
        )
    }

    fn declare_log_bucket(&self) -> (LogBucket, Resource) {
        let logical_id = self.scope.logical_id("LogBucket");
        let name = ResourceId::new(self.scope.physical_name("log", "LogBucket"));
        let resource = Resource::new(
            logical_id.clone(),
            ResourceKind::Bucket,
            json!({
                "BucketName": name,
                "BucketEncryption": server_managed_encryption(),
                "PublicAccessBlockConfiguration": block_all_public_access(),
            }),
        )
        .retained();
        (LogBucket { name, logical_id }, resource)
    }

    fn declare_primary_bucket(&self, log: &LogBucket) -> (ContentBucket, Resource) {
        let logical_id = self.scope.logical_id("Bucket");
        let name = ResourceId::new(self.scope.physical_name("data", "Bucket"));
        let resource = Resource::new(
            logical_id.clone(),
            ResourceKind::Bucket,
            json!({
                "BucketName": name,
                "BucketEncryption": server_managed_encryption(),
                "VersioningConfiguration": { "Status": "Enabled" },
                "PublicAccessBlockConfiguration": block_all_public_access(),
                "LoggingConfiguration": {
                    "DestinationBucketName": log.name(),
                    "LogFilePrefix": ACCESS_LOG_PREFIX,
                },
            }),
        )
        .depends_on(log.logical_id())
        .retained();
        let bucket = ContentBucket {
            name,
            logical_id,
            log_target: log.name().clone(),
            versioned: true,
        };
        (bucket, resource)
    }
}

fn server_managed_encryption() -> Value {
    json!({
        "ServerSideEncryptionConfiguration": [{
            "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
        }],
    })
}

fn block_all_public_access() -> Value {
    json!({
        "BlockPublicAcls": true,
        "BlockPublicPolicy": true,
        "IgnorePublicAcls": true,
        "RestrictPublicBuckets": true,
    })
}

#[cfg(test)]
mod tests {
    use stratus_common::config::StackSettings;
    use stratus_common::types::ComponentKind;

    use super::*;
    use crate::naming::Namer;

    fn build() -> Built<BucketPair> {
        ObjectStore::new(Namer::new(&StackSettings::default()).scope(ComponentKind::ObjectStore))
            .build()
    }

    #[test]
    fn primary_logs_into_log_bucket() {
        let built = build();
        let pair = &built.handle;
        assert_eq!(pair.primary().log_target(), pair.log().name());
        let primary = &built.resources[1];
        assert_eq!(
            primary.properties["LoggingConfiguration"]["DestinationBucketName"],
            pair.log().name().as_str()
        );
        assert_eq!(
            primary.properties["LoggingConfiguration"]["LogFilePrefix"],
            "access-logs/"
        );
    }

    #[test]
    fn log_bucket_is_declared_first() {
        let built = build();
        assert_eq!(built.resources[0].logical_id, *built.handle.log().logical_id());
        assert_eq!(
            built.resources[1].depends_on,
            vec![built.handle.log().logical_id().clone()]
        );
    }

    #[test]
    fn both_buckets_are_retained_encrypted_and_private() {
        for resource in build().resources {
            assert!(resource.retain);
            assert_eq!(
                resource.properties["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]
                    ["ServerSideEncryptionByDefault"]["SSEAlgorithm"],
                "AES256"
            );
            assert_eq!(
                resource.properties["PublicAccessBlockConfiguration"]["BlockPublicAcls"],
                true
            );
        }
    }

    #[test]
    fn only_primary_is_versioned() {
        let built = build();
        assert!(built.handle.primary().versioned());
        assert!(built.resources[0].property("VersioningConfiguration").is_none());
        assert_eq!(
            built.resources[1].properties["VersioningConfiguration"]["Status"],
            "Enabled"
        );
    }

    #[test]
    fn bucket_names_are_distinct_and_prefixed() {
        let built = build();
        let primary = built.handle.primary().name().as_str();
        let log = built.handle.log().name().as_str();
        assert!(primary.starts_with("data-objectstore-"), "got: {primary}");
        assert!(log.starts_with("log-objectstore-"), "got: {log}");
        assert_ne!(primary, log);
    }
}
