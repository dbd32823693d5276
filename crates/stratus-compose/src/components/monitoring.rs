//! Low-utilization alarm on the compute node.
//!
//! Without a compute node no alarm is declared and a diagnostic is raised
//! instead. Actions are attached only when the channel is actionable; the
//! alarm itself does not depend on that.

use serde_json::json;
use stratus_common::constants::{
    ALARM_EVALUATION_PERIODS, ALARM_PERIOD_SECS, ALARM_THRESHOLD, COMPUTE_METRIC_NAMESPACE,
    CPU_METRIC_NAME,
};
use stratus_common::types::ResourceId;

use super::Built;
use crate::handle::{AlarmBinding, ChannelIdentity, ComparisonOperator, ComputeHandle};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;
use crate::result::Diagnostic;

/// Builder for the utilization alarm.
#[derive(Debug, Clone)]
pub struct Observability {
    scope: Scope,
}

impl Observability {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Declares the alarm, or returns an absent handle with a diagnostic
    /// when `compute` is absent.
    #[must_use]
    pub fn build(
        &self,
        compute: Option<&ComputeHandle>,
        channel: &ChannelIdentity,
    ) -> Built<Option<AlarmBinding>> {
        let component = self.scope.component();
        let Some(compute) = compute else {
            return Built::new(None, Vec::new()).with_diagnostic(Diagnostic::warn(
                component,
                "No compute instance provided; skipping alarm creation.",
            ));
        };

        let actionable = channel.is_actionable();
        let actions: Vec<ResourceId> = if actionable {
            vec![channel.arn().clone()]
        } else {
            Vec::new()
        };

        let logical_id = self.scope.logical_id("CpuLowAlarm");
        let alarm_name = ResourceId::new(format!(
            "{}-{}",
            self.scope.stack_name(),
            self.scope.physical_name("cpulow", "CpuLowAlarm")
        ));
        let comparison = ComparisonOperator::LessThanThreshold;
        let mut resource = Resource::new(
            logical_id.clone(),
            ResourceKind::Alarm,
            json!({
                "AlarmName": alarm_name,
                "AlarmDescription":
                    "Triggers when CPU utilization falls below 10% for two 5-minute periods",
                "Namespace": COMPUTE_METRIC_NAMESPACE,
                "MetricName": CPU_METRIC_NAME,
                "Dimensions": [{ "Name": "InstanceId", "Value": compute.instance_id() }],
                "Statistic": "Average",
                "Period": ALARM_PERIOD_SECS,
                "EvaluationPeriods": ALARM_EVALUATION_PERIODS,
                "Threshold": ALARM_THRESHOLD,
                "ComparisonOperator": comparison.as_str(),
                "ActionsEnabled": actionable,
                "AlarmActions": actions,
            }),
        )
        .depends_on(compute.logical_id());
        if let Some(topic) = channel.logical_id() {
            resource = resource.depends_on(topic);
        }

        tracing::info!(
            component = %component,
            alarm = %alarm_name,
            instance_id = %compute.instance_id(),
            actions_enabled = actionable,
            "utilization alarm declared"
        );

        let binding = AlarmBinding {
            alarm_name,
            logical_id,
            namespace: COMPUTE_METRIC_NAMESPACE.to_string(),
            metric_name: CPU_METRIC_NAME.to_string(),
            instance_id: compute.instance_id().clone(),
            period_secs: ALARM_PERIOD_SECS,
            evaluation_periods: ALARM_EVALUATION_PERIODS,
            threshold: ALARM_THRESHOLD,
            comparison,
            actions_enabled: actionable,
            actions,
        };
        let built = Built::new(Some(binding), vec![resource]);
        if actionable {
            built
        } else {
            built.with_diagnostic(Diagnostic::warn(
                component,
                format!(
                    "alert channel {} is not actionable; alarm actions disabled",
                    channel.arn()
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use stratus_common::config::StackSettings;
    use stratus_common::types::{ComponentKind, LogicalId};

    use super::*;
    use crate::components::NetworkCompute;
    use crate::naming::Namer;

    fn namer() -> Namer {
        Namer::new(&StackSettings::default())
    }

    fn compute() -> ComputeHandle {
        NetworkCompute::new(namer().scope(ComponentKind::NetworkCompute))
            .build()
            .expect("build")
            .handle
            .1
    }

    fn observability() -> Observability {
        Observability::new(namer().scope(ComponentKind::Observability))
    }

    fn referenced(arn: &str) -> ChannelIdentity {
        ChannelIdentity::Referenced {
            arn: ResourceId::new(arn),
        }
    }

    #[test]
    fn absent_compute_skips_alarm_with_diagnostic() {
        let built = observability().build(None, &referenced("arn:aws:sns:us-east-1:1:t"));
        assert!(built.handle.is_none());
        assert!(built.resources.is_empty());
        assert_eq!(built.diagnostics.len(), 1);
        assert_eq!(built.diagnostics[0].component, ComponentKind::Observability);
    }

    #[test]
    fn alarm_uses_fixed_threshold_parameters() {
        let compute = compute();
        let built = observability().build(Some(&compute), &referenced("arn:aws:sns:us-east-1:1:t"));
        let alarm = built.handle.expect("alarm");
        assert!((alarm.threshold() - 10.0).abs() < f64::EPSILON);
        assert_eq!(alarm.evaluation_periods(), 2);
        assert_eq!(alarm.period_secs(), 300);
        assert_eq!(alarm.comparison(), ComparisonOperator::LessThanThreshold);
        assert_eq!(alarm.namespace(), "AWS/EC2");
        assert_eq!(alarm.metric_name(), "CPUUtilization");
        assert_eq!(alarm.instance_id(), compute.instance_id());
    }

    #[test]
    fn actionable_channel_receives_alarm_actions() {
        let arn = "arn:aws:sns:us-east-1:123456789012:my-alarm-topic";
        let built = observability().build(Some(&compute()), &referenced(arn));
        assert!(built.diagnostics.is_empty());
        let resource = &built.resources[0];
        assert_eq!(resource.properties["ActionsEnabled"], true);
        assert_eq!(resource.properties["AlarmActions"][0], arn);
        assert_eq!(resource.properties["Statistic"], "Average");
        assert_eq!(resource.properties["ComparisonOperator"], "LessThanThreshold");
    }

    #[test]
    fn non_actionable_channel_keeps_alarm_but_disables_actions() {
        let built = observability().build(Some(&compute()), &referenced("my-topic"));
        let alarm = built.handle.as_ref().expect("alarm");
        assert!(!alarm.actions_enabled());
        assert!(alarm.actions().is_empty());
        assert_eq!(built.diagnostics.len(), 1);
    }

    #[test]
    fn created_channel_becomes_a_dependency() {
        let channel = ChannelIdentity::Created {
            arn: ResourceId::new("arn:aws:sns:us-east-1:123456789012:new"),
            logical_id: LogicalId::new("AlertChannelTopic"),
            display_name: "Infrastructure Alarms".into(),
        };
        let built = observability().build(Some(&compute()), &channel);
        assert!(built.resources[0]
            .depends_on
            .contains(&LogicalId::new("AlertChannelTopic")));
    }
}
