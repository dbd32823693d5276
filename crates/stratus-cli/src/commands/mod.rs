//! CLI command definitions and dispatch.

pub mod plan;
pub mod synth;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use stratus_common::config::{ConfigurationBundle, StackSettings};
use stratus_common::constants::{
    BIN_NAME, DEFAULT_ACCOUNT, DEFAULT_ADMIN_CIDR, DEFAULT_REGION, DEFAULT_STACK_NAME,
    KEY_NAME_ENV,
};

/// Stratus: compose a cloud stack and synthesize its manifest.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Stack and configuration options shared by every subcommand.
    #[command(flatten)]
    pub stack: StackArgs,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose the stack and write the resulting manifest.
    Synth(synth::SynthArgs),
    /// Show which components would be realized or omitted.
    Plan(plan::PlanArgs),
}

/// Options that select the stack and supply the configuration bundle.
///
/// Bundle parameters resolve as flag, then environment variable, then the
/// configuration file.
#[derive(Args, Debug, Default)]
pub struct StackArgs {
    /// JSON or YAML file holding the configuration bundle.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Stack name; the root of every derived identifier.
    #[arg(long, global = true, default_value = DEFAULT_STACK_NAME)]
    pub stack_name: String,

    /// Seed mixed into generated names (defaults to the stack name).
    #[arg(long, global = true)]
    pub seed: Option<String>,

    /// Target region.
    #[arg(long, global = true, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Target account.
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNT)]
    pub account: String,

    /// Source range allowed on the administrative port.
    #[arg(long, global = true, default_value = DEFAULT_ADMIN_CIDR)]
    pub admin_cidr: String,

    /// Build the network without a compute node.
    #[arg(long, global = true)]
    pub no_compute: bool,

    /// Public domain served through the hosted zone.
    #[arg(long, global = true, env = "STRATUS_DOMAIN_NAME")]
    pub domain_name: Option<String>,

    /// Certificate for the identity provider's custom hostname.
    #[arg(long, global = true, env = "STRATUS_CERTIFICATE_ARN")]
    pub certificate_arn: Option<String>,

    /// Access-key name installed on the compute node.
    #[arg(long = "ec2-key-name", global = true, env = KEY_NAME_ENV)]
    pub key_name: Option<String>,

    /// Existing alert channel to reuse.
    #[arg(long, global = true, env = "STRATUS_ALARM_TOPIC_ARN")]
    pub alarm_topic_arn: Option<String>,
}

impl StackArgs {
    /// Stack settings selected by the flags.
    #[must_use]
    pub fn settings(&self) -> StackSettings {
        StackSettings {
            stack_name: self.stack_name.clone(),
            seed: self.seed.clone(),
            account: self.account.clone(),
            region: self.region.clone(),
            admin_ingress_cidr: self.admin_cidr.clone(),
            compute_node: !self.no_compute,
        }
    }

    /// Resolves the configuration bundle: the file, if any, overlaid with
    /// flags and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn bundle(&self) -> anyhow::Result<ConfigurationBundle> {
        let base = match &self.config {
            Some(path) => ConfigurationBundle::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => ConfigurationBundle::default(),
        };
        let overlay = ConfigurationBundle {
            domain_name: self.domain_name.clone(),
            certificate_id: self.certificate_arn.clone(),
            key_name: self.key_name.clone(),
            alert_channel_id: self.alarm_topic_arn.clone(),
        };
        Ok(base.merged_with(overlay))
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Synth(args) => synth::execute(&cli.stack, args),
        Command::Plan(args) => plan::execute(&cli.stack, args),
    }
}
