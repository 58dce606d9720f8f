use std::sync::Arc;

use roleward_core::{AppResult, ConnectedIdentity, IdentitySource};
use roleward_domain::{LogicalPrincipal, Principal};
use tracing::{debug, warn};

use crate::PrincipalDirectory;

/// Reconciles legacy and unified principal records into one logical view.
///
/// Both directories are consulted for every identity. When both hold a record
/// the unified record owns the role and the legacy record contributes grants
/// only. A directory that fails is treated as holding no record.
#[derive(Clone)]
pub struct IdentityAdapter {
    legacy: Arc<dyn PrincipalDirectory>,
    unified: Arc<dyn PrincipalDirectory>,
}

impl IdentityAdapter {
    /// Creates an adapter over the two identity sources.
    #[must_use]
    pub fn new(legacy: Arc<dyn PrincipalDirectory>, unified: Arc<dyn PrincipalDirectory>) -> Self {
        Self { legacy, unified }
    }

    /// Returns the directory serving an identity source.
    #[must_use]
    pub fn directory(&self, source: IdentitySource) -> Arc<dyn PrincipalDirectory> {
        match source {
            IdentitySource::Legacy => self.legacy.clone(),
            IdentitySource::Unified => self.unified.clone(),
        }
    }

    /// Resolves the logical principal for a connected identity.
    ///
    /// Returns `None` when neither source knows the identity.
    pub async fn resolve(&self, identity: &ConnectedIdentity) -> Option<LogicalPrincipal> {
        let (legacy, unified) = tokio::join!(
            lookup(self.legacy.as_ref(), identity.value()),
            lookup(self.unified.as_ref(), identity.value()),
        );

        let logical = match (legacy, unified) {
            (Some(legacy), Some(unified)) => {
                if legacy.role() != unified.role() {
                    debug!(
                        identity = identity.value(),
                        legacy_role = %legacy.role(),
                        unified_role = %unified.role(),
                        "identity sources disagree on role, unified role wins"
                    );
                }
                Some(LogicalPrincipal::merged(legacy, unified))
            }
            (Some(only), None) | (None, Some(only)) => Some(LogicalPrincipal::single(only)),
            (None, None) => None,
        };

        debug!(
            identity = identity.value(),
            origin = %identity.source(),
            resolved = logical.is_some(),
            "resolved connected identity"
        );

        logical
    }

    /// Re-reads the records behind an already resolved principal.
    pub async fn reload(&self, principal: &LogicalPrincipal) -> AppResult<Option<LogicalPrincipal>> {
        let primary = principal.primary();
        let identity = ConnectedIdentity::new(primary.bound_identity(), primary.identity_source())?;
        Ok(self.resolve(&identity).await)
    }
}

async fn lookup(directory: &dyn PrincipalDirectory, identity: &str) -> Option<Principal> {
    match directory.find_by_identity(identity).await {
        Ok(principal) => principal,
        Err(error) => {
            warn!(
                source = %directory.source(),
                error = %error,
                "principal lookup failed, treating source as empty"
            );
            None
        }
    }
}
