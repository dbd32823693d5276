//! Configuration model for a composition pass.
//!
//! The bundle is fully resolved before the engine sees it: environment
//! fallbacks are applied once at the entry point and components never read
//! process state themselves.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_STACK_NAME_LENGTH;
use crate::error::{Result, StratusError};

/// Caller-supplied parameters. Every field is optional; an absent field
/// disables the component that depends on it instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationBundle {
    /// Public domain served through the hosted zone.
    pub domain_name: Option<String>,
    /// TLS certificate identifier for the identity provider hostname.
    #[serde(alias = "certificateArn")]
    pub certificate_id: Option<String>,
    /// Access-key name installed on the compute node.
    #[serde(alias = "ec2KeyName")]
    pub key_name: Option<String>,
    /// Pre-existing alert channel to reuse.
    #[serde(alias = "alarmTopicArn")]
    pub alert_channel_id: Option<String>,
}

/// What the identity provider should do with the domain parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainBindingRequest {
    /// Both hostname and certificate are present.
    Custom(DomainBinding),
    /// Only one of the two was supplied; falls back to the generated hostname.
    Partial {
        /// Which parameter was missing.
        missing: &'static str,
    },
    /// Neither was supplied.
    None,
}

/// A custom hostname together with the certificate that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBinding {
    /// Hostname bound to the identity provider.
    pub hostname: String,
    /// Certificate identifier for the hostname.
    pub certificate_id: String,
}

impl ConfigurationBundle {
    /// Loads a bundle from a JSON or YAML file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration bundle");
        let content = std::fs::read_to_string(path).map_err(|e| StratusError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Overlays `other` on top of `self`: fields set in `other` win.
    ///
    /// Blank overlay values count as unset and never clear a base value.
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        let other = other.normalized();
        Self {
            domain_name: other.domain_name.or(self.domain_name),
            certificate_id: other.certificate_id.or(self.certificate_id),
            key_name: other.key_name.or(self.key_name),
            alert_channel_id: other.alert_channel_id.or(self.alert_channel_id),
        }
    }

    /// Returns a copy with blank strings treated as absent.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            domain_name: present(self.domain_name),
            certificate_id: present(self.certificate_id),
            key_name: present(self.key_name),
            alert_channel_id: present(self.alert_channel_id),
        }
    }

    /// Resolves the identity provider hostname request.
    ///
    /// The custom hostname is `<label>.<domain_name>`.
    #[must_use]
    pub fn domain_binding(&self, label: &str) -> DomainBindingRequest {
        match (&self.domain_name, &self.certificate_id) {
            (Some(domain), Some(cert)) => DomainBindingRequest::Custom(DomainBinding {
                hostname: format!("{label}.{}", domain.trim_end_matches('.').to_ascii_lowercase()),
                certificate_id: cert.clone(),
            }),
            (Some(_), None) => DomainBindingRequest::Partial {
                missing: "certificate identifier",
            },
            (None, Some(_)) => DomainBindingRequest::Partial {
                missing: "domain name",
            },
            (None, None) => DomainBindingRequest::None,
        }
    }
}

/// Stack-level settings that scope identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackSettings {
    /// Stack name, used as the root of every derived name.
    pub stack_name: String,
    /// Seed mixed into generated names; defaults to the stack name.
    pub seed: Option<String>,
    /// Target account for ARN-shaped identifiers.
    pub account: String,
    /// Target region for ARN-shaped identifiers.
    pub region: String,
    /// Source range allowed on the administrative port.
    pub admin_ingress_cidr: String,
    /// Whether the network carries a compute node.
    pub compute_node: bool,
}

impl StackSettings {
    /// Checks that the stack name can be embedded in generated names and
    /// identifiers: an ASCII letter followed by letters, digits, or hyphens,
    /// at most [`MAX_STACK_NAME_LENGTH`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidSpec`] naming the first violation.
    pub fn validate(&self) -> Result<()> {
        let name = self.stack_name.as_str();
        let invalid = |reason: String| {
            StratusError::invalid_spec("StackSettings", format!("stack name \"{name}\" {reason}"))
        };
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("must start with an ASCII letter".into()));
        }
        if name.len() > MAX_STACK_NAME_LENGTH {
            return Err(invalid(format!(
                "exceeds {MAX_STACK_NAME_LENGTH} characters"
            )));
        }
        if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(invalid(format!("contains invalid character '{c}'")));
        }
        Ok(())
    }

    /// Returns the effective naming seed.
    #[must_use]
    pub fn naming_seed(&self) -> &str {
        self.seed.as_deref().unwrap_or(&self.stack_name)
    }
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            stack_name: crate::constants::DEFAULT_STACK_NAME.to_string(),
            seed: None,
            account: crate::constants::DEFAULT_ACCOUNT.to_string(),
            region: crate::constants::DEFAULT_REGION.to_string(),
            admin_ingress_cidr: crate::constants::DEFAULT_ADMIN_CIDR.to_string(),
            compute_node: true,
        }
    }
}
