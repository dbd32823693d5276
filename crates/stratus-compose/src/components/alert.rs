//! Notification channel: reuse a caller-supplied one or declare a new one.

use serde_json::json;
use stratus_common::constants::ALERT_CHANNEL_LABEL;
use stratus_common::types::ResourceId;

use super::Built;
use crate::handle::ChannelIdentity;
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

/// Resolver for the alert channel.
#[derive(Debug, Clone)]
pub struct AlertChannel {
    scope: Scope,
}

impl AlertChannel {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Wraps `existing` as a reference, or declares a new channel when none
    /// is supplied. A referenced channel declares no resources.
    #[must_use]
    pub fn resolve(&self, existing: Option<&str>) -> Built<ChannelIdentity> {
        if let Some(arn) = existing {
            tracing::info!(
                component = %self.scope.component(),
                arn,
                "reusing existing alert channel"
            );
            return Built::new(
                ChannelIdentity::Referenced {
                    arn: ResourceId::new(arn),
                },
                Vec::new(),
            );
        }

        let logical_id = self.scope.logical_id("Topic");
        let topic_name = format!(
            "{}-{}",
            self.scope.stack_name(),
            self.scope.physical_name("alarms", "Topic")
        );
        let arn = self.scope.arn("sns", &topic_name);
        let resource = Resource::new(
            logical_id.clone(),
            ResourceKind::Topic,
            json!({
                "TopicName": topic_name,
                "DisplayName": ALERT_CHANNEL_LABEL,
            }),
        );
        tracing::info!(
            component = %self.scope.component(),
            arn = %arn,
            "alert channel declared"
        );
        Built::new(
            ChannelIdentity::Created {
                arn,
                logical_id,
                display_name: ALERT_CHANNEL_LABEL.to_string(),
            },
            vec![resource],
        )
    }
}

#[cfg(test)]
mod tests {
    use stratus_common::config::StackSettings;
    use stratus_common::types::ComponentKind;

    use super::*;
    use crate::naming::Namer;

    fn channel() -> AlertChannel {
        AlertChannel::new(Namer::new(&StackSettings::default()).scope(ComponentKind::AlertChannel))
    }

    #[test]
    fn supplied_channel_is_referenced_without_resources() {
        let arn = "arn:aws:sns:us-east-1:123456789012:my-alarm-topic";
        let built = channel().resolve(Some(arn));
        assert!(built.handle.is_referenced());
        assert!(!built.handle.is_created());
        assert_eq!(built.handle.arn().as_str(), arn);
        assert!(built.resources.is_empty());
    }

    #[test]
    fn missing_channel_is_created_with_display_label() {
        let built = channel().resolve(None);
        assert!(built.handle.is_created());
        assert!(!built.handle.is_referenced());
        assert_eq!(built.resources.len(), 1);
        assert_eq!(built.resources[0].properties["DisplayName"], "Infrastructure Alarms");
        assert!(built.handle.is_actionable());
        assert!(
            built
                .handle
                .arn()
                .as_str()
                .starts_with("arn:aws:sns:us-east-1:123456789012:StratusStack-alarms-alertchannel-")
        );
    }
}
