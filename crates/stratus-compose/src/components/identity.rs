//! User directory, public OAuth client, and hostname binding.

use serde_json::json;
use stratus_common::config::DomainBinding;
use stratus_common::types::ResourceId;

use super::Built;
use crate::handle::{IdentityDomain, IdentityHandle};
use crate::manifest::{Resource, ResourceKind};
use crate::naming::Scope;

/// OAuth scopes granted to the client.
pub const OAUTH_SCOPES: [&str; 2] = ["openid", "email"];

/// Builder for the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    scope: Scope,
}

impl IdentityProvider {
    /// Creates the component.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Declares the directory, its client, and its hostname.
    ///
    /// With a binding, the caller's hostname and certificate are used.
    /// Without one, a hostname unique to this stack is generated.
    #[must_use]
    pub fn build(&self, binding: Option<&DomainBinding>) -> Built<IdentityHandle> {
        let scope = &self.scope;
        let pool_logical = scope.logical_id("UserPool");
        let directory_id = ResourceId::new(format!(
            "{}_{}",
            scope.region(),
            &scope.address("UserPool")[..9]
        ));
        let pool = Resource::new(
            pool_logical.clone(),
            ResourceKind::UserPool,
            json!({
                "AdminCreateUserConfig": { "AllowAdminCreateUserOnly": false },
                "UsernameAttributes": ["email"],
                "UsernameConfiguration": { "CaseSensitive": false },
                "AutoVerifiedAttributes": ["email"],
                "Schema": [{ "Name": "email", "Required": true, "Mutable": true }],
                "AccountRecoverySetting": {
                    "RecoveryMechanisms": [{ "Name": "verified_email", "Priority": 1 }],
                },
            }),
        )
        .retained();

        let client_logical = scope.logical_id("UserPoolClient");
        let client_id = ResourceId::new(scope.address("UserPoolClient"));
        let client = Resource::new(
            client_logical,
            ResourceKind::UserPoolClient,
            json!({
                "UserPoolId": directory_id,
                "GenerateSecret": false,
                "AllowedOAuthFlows": ["code"],
                "AllowedOAuthFlowsUserPoolClient": true,
                "AllowedOAuthScopes": OAUTH_SCOPES,
                "SupportedIdentityProviders": ["COGNITO"],
            }),
        )
        .depends_on(&pool_logical);

        let domain = self.resolve_domain(binding);
        let domain_properties = match &domain {
            IdentityDomain::Custom {
                hostname,
                certificate_id,
            } => json!({
                "UserPoolId": directory_id,
                "Domain": hostname,
                "CustomDomainConfig": { "CertificateArn": certificate_id },
            }),
            IdentityDomain::Generated { prefix, .. } => json!({
                "UserPoolId": directory_id,
                "Domain": prefix,
            }),
        };
        let domain_resource = Resource::new(
            scope.logical_id("UserPoolDomain"),
            ResourceKind::UserPoolDomain,
            domain_properties,
        )
        .depends_on(&pool_logical);

        tracing::info!(
            component = %scope.component(),
            directory_id = %directory_id,
            hostname = domain.hostname(),
            custom = domain.is_custom(),
            "identity provider declared"
        );

        let handle = IdentityHandle {
            directory_id,
            directory_logical_id: pool_logical,
            client_id,
            domain,
        };
        Built::new(handle, vec![pool, client, domain_resource])
    }

    fn resolve_domain(&self, binding: Option<&DomainBinding>) -> IdentityDomain {
        match binding {
            Some(binding) => IdentityDomain::Custom {
                hostname: binding.hostname.clone(),
                certificate_id: binding.certificate_id.clone(),
            },
            None => {
                let prefix = format!(
                    "{}-{}",
                    self.scope.component().as_str().to_ascii_lowercase(),
                    self.scope.address("UserPoolDomain")
                );
                let hostname = format!("{prefix}.auth.{}.amazoncognito.com", self.scope.region());
                IdentityDomain::Generated { prefix, hostname }
            }
        }
    }
}
