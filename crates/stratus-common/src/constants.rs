//! Fixed parameters of the synthesized topology and workspace defaults.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stratus";

/// Description attached to every synthesized manifest.
pub const STACK_DESCRIPTION: &str =
    "AWS infrastructure stack with VPC, EC2, S3, Cognito, Route 53, and CloudWatch monitoring";

/// Stack name used when none is configured.
pub const DEFAULT_STACK_NAME: &str = "StratusStack";

/// Longest accepted stack name.
pub const MAX_STACK_NAME_LENGTH: usize = 128;

/// Placeholder account used when none is configured.
pub const DEFAULT_ACCOUNT: &str = "123456789012";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable consulted by the CLI for the compute access key.
pub const KEY_NAME_ENV: &str = "EC2_KEY_NAME";

/// Number of availability zones the network spans.
pub const NETWORK_MAX_AZS: u8 = 2;

/// Number of NAT gateways backing the private-with-egress subnets.
pub const NETWORK_NAT_GATEWAYS: u8 = 1;

/// Administrative port opened on the compute access-control group.
pub const ADMIN_PORT: u16 = 22;

/// Source range allowed on the administrative port unless overridden.
pub const DEFAULT_ADMIN_CIDR: &str = "0.0.0.0/0";

/// Compute node instance type.
pub const INSTANCE_TYPE: &str = "t2.micro";

/// Machine image family for the compute node.
pub const MACHINE_IMAGE: &str = "amazon-linux";

/// Boot device name of the compute node.
pub const BOOT_DEVICE: &str = "/dev/xvda";

/// Boot volume size in GiB.
pub const BOOT_VOLUME_GIB: u32 = 8;

/// Largest boot volume accepted, in GiB.
pub const MAX_VOLUME_GIB: u32 = 16_384;

/// Idle timeout of the load-distribution endpoint, in seconds.
pub const IDLE_TIMEOUT_SECS: u32 = 60;

/// Label of the alias record under the hosted zone.
pub const API_RECORD_LABEL: &str = "api";

/// Label prefixed to the domain for the identity provider hostname.
pub const AUTH_RECORD_LABEL: &str = "auth";

/// Cache lifetime of the alias record, in seconds.
pub const RECORD_TTL_SECS: u32 = 300;

/// Display label of a freshly created alert channel.
pub const ALERT_CHANNEL_LABEL: &str = "Infrastructure Alarms";

/// Metric namespace of the compute node.
pub const COMPUTE_METRIC_NAMESPACE: &str = "AWS/EC2";

/// Metric watched by the utilization alarm.
pub const CPU_METRIC_NAME: &str = "CPUUtilization";

/// Sampling period of the utilization alarm, in seconds.
pub const ALARM_PERIOD_SECS: u32 = 300;

/// Consecutive periods before the utilization alarm fires.
pub const ALARM_EVALUATION_PERIODS: u32 = 2;

/// Utilization threshold, in percent.
pub const ALARM_THRESHOLD: f64 = 10.0;

/// Prefix applied to access-log objects in the log bucket.
pub const ACCESS_LOG_PREFIX: &str = "access-logs/";

/// Length of a derived scope address in hex characters.
pub const SCOPE_ADDRESS_LENGTH: usize = 20;
