//! Deterministic, scope-derived naming.
//!
//! Every generated name is a pure function of the stack-level seed, the
//! stack name, the owning component, and the resource within it. The same
//! inputs always produce the same identifiers; different stacks or seeds
//! never collide in practice.

use sha2::{Digest, Sha256};
use stratus_common::config::StackSettings;
use stratus_common::constants::SCOPE_ADDRESS_LENGTH;
use stratus_common::types::{ComponentKind, LogicalId, ResourceId};

/// Derives the scope address for `path` under `seed`.
///
/// The address is the first [`SCOPE_ADDRESS_LENGTH`] lowercase hex
/// characters of `SHA-256(seed "/" path)`.
#[must_use]
pub fn scope_address(seed: &str, path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b"/");
    hasher.update(path.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(SCOPE_ADDRESS_LENGTH);
    hex
}

/// Stack-level naming context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namer {
    stack_name: String,
    seed: String,
    account: String,
    region: String,
}

impl Namer {
    /// Creates a namer from stack settings.
    #[must_use]
    pub fn new(settings: &StackSettings) -> Self {
        Self {
            stack_name: settings.stack_name.clone(),
            seed: settings.naming_seed().to_string(),
            account: settings.account.clone(),
            region: settings.region.clone(),
        }
    }

    /// Returns the naming scope of a single component.
    #[must_use]
    pub fn scope(&self, component: ComponentKind) -> Scope {
        Scope {
            namer: self.clone(),
            component,
        }
    }
}

/// Naming scope of one component within a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    namer: Namer,
    component: ComponentKind,
}

impl Scope {
    /// The component this scope belongs to.
    #[must_use]
    pub const fn component(&self) -> ComponentKind {
        self.component
    }

    /// Target region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.namer.region
    }

    /// Stack name.
    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.namer.stack_name
    }

    /// Scope address of `resource` within this component.
    #[must_use]
    pub fn address(&self, resource: &str) -> String {
        let path = format!(
            "{}/{}/{resource}",
            self.namer.stack_name,
            self.component.as_str()
        );
        scope_address(&self.namer.seed, &path)
    }

    /// Manifest-local logical ID, e.g. `NetworkComputeVpc`.
    #[must_use]
    pub fn logical_id(&self, resource: &str) -> LogicalId {
        LogicalId::new(format!("{}{resource}", self.component.as_str()))
    }

    /// Lowercase physical name `<prefix>-<component>-<address>`.
    #[must_use]
    pub fn physical_name(&self, prefix: &str, resource: &str) -> String {
        format!(
            "{prefix}-{}-{}",
            self.component.as_str().to_ascii_lowercase(),
            self.address(resource)
        )
    }

    /// Provider-shaped resource ID `<prefix>-<17 hex chars>`.
    #[must_use]
    pub fn resource_id(&self, prefix: &str, resource: &str) -> ResourceId {
        let address = self.address(resource);
        ResourceId::new(format!("{prefix}-{}", &address[..17]))
    }

    /// ARN in this scope's account and region.
    #[must_use]
    pub fn arn(&self, service: &str, resource_path: &str) -> ResourceId {
        ResourceId::new(format!(
            "arn:aws:{service}:{}:{}:{resource_path}",
            self.namer.region, self.namer.account
        ))
    }
}
