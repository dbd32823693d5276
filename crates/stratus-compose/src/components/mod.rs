//! Infrastructure components.
//!
//! Each component takes only the handles it needs, declares the resources
//! it owns, and returns read-only handles for its dependents. Components
//! never touch the manifest directly: the composition root collects their
//! resources in dependency order.

pub mod alert;
pub mod balancer;
pub mod dns;
pub mod identity;
pub mod monitoring;
pub mod network;
pub mod storage;

pub use alert::AlertChannel;
pub use balancer::EdgeBalancer;
pub use dns::{DomainName, NameResolution};
pub use identity::IdentityProvider;
pub use monitoring::Observability;
pub use network::NetworkCompute;
pub use storage::ObjectStore;

use crate::manifest::Resource;
use crate::result::Diagnostic;

/// What a component produced: its handle, the resources it owns, and any
/// non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct Built<H> {
    /// Handle exposed to dependents.
    pub handle: H,
    /// Resources in the order they must be declared.
    pub resources: Vec<Resource>,
    /// Non-fatal diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl<H> Built<H> {
    /// Wraps a handle with its resources.
    #[must_use]
    pub const fn new(handle: H, resources: Vec<Resource>) -> Self {
        Self {
            handle,
            resources,
            diagnostics: Vec::new(),
        }
    }

    /// Attaches a diagnostic.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}
