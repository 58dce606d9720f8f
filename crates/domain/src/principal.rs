use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use roleward_core::{AppError, AppResult, IdentitySource};
use serde::{Deserialize, Serialize};

use crate::permission::{ElevationTier, Permission};
use crate::role::RoleId;

/// Administrative principal record kept by one identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: String,
    identity_source: IdentitySource,
    bound_identity: String,
    role: RoleId,
    #[serde(default)]
    explicit_overrides: BTreeSet<Permission>,
    is_active: bool,
    last_active_at: DateTime<Utc>,
}

impl Principal {
    /// Creates an active principal with no explicit overrides.
    pub fn new(
        id: impl Into<String>,
        identity_source: IdentitySource,
        bound_identity: impl Into<String>,
        role: RoleId,
        last_active_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let id = id.into();
        let bound_identity = bound_identity.into();
        if id.trim().is_empty() || bound_identity.trim().is_empty() {
            return Err(AppError::Validation(
                "principal id and bound identity must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            identity_source,
            bound_identity,
            role,
            explicit_overrides: BTreeSet::new(),
            is_active: true,
            last_active_at,
        })
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the identity source that owns the record.
    #[must_use]
    pub fn identity_source(&self) -> IdentitySource {
        self.identity_source
    }

    /// Returns the wallet address or account id the record is bound to.
    #[must_use]
    pub fn bound_identity(&self) -> &str {
        self.bound_identity.as_str()
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> &RoleId {
        &self.role
    }

    /// Returns the grant-only permission supplements.
    #[must_use]
    pub fn explicit_overrides(&self) -> &BTreeSet<Permission> {
        &self.explicit_overrides
    }

    /// Returns whether the record may be used for authorization.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the last recorded activity timestamp.
    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Returns a copy carrying the given explicit overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = Permission>) -> Self {
        self.explicit_overrides = overrides.into_iter().collect();
        self
    }

    /// Returns a copy with a different role.
    #[must_use]
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = role;
        self
    }

    /// Returns a copy with the given activity flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns a copy with a new activity timestamp.
    #[must_use]
    pub fn touched_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_active_at = at;
        self
    }
}

/// Principal view reconciled across both identity sources.
///
/// `primary` carries the authoritative role. `secondary` is the other
/// source's record for the same actor; only its grants are consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPrincipal {
    primary: Principal,
    secondary: Option<Principal>,
}

impl LogicalPrincipal {
    /// Wraps a record known to a single identity source.
    #[must_use]
    pub fn single(primary: Principal) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Merges two records, letting the unified record own the role.
    #[must_use]
    pub fn merged(first: Principal, second: Principal) -> Self {
        let (primary, secondary) = if second.identity_source() == IdentitySource::Unified
            && first.identity_source() != IdentitySource::Unified
        {
            (second, first)
        } else {
            (first, second)
        };

        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Returns the authoritative record.
    #[must_use]
    pub fn primary(&self) -> &Principal {
        &self.primary
    }

    /// Returns the other source's record, if any.
    #[must_use]
    pub fn secondary(&self) -> Option<&Principal> {
        self.secondary.as_ref()
    }

    /// Returns the authoritative role.
    #[must_use]
    pub fn role(&self) -> &RoleId {
        self.primary.role()
    }

    /// Returns whether the authoritative record is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.primary.is_active()
    }

    /// Returns the elevation tier of the authoritative role.
    #[must_use]
    pub fn elevation_tier(&self) -> Option<ElevationTier> {
        self.primary.role().elevation_tier()
    }

    /// Returns every active record whose grants count toward resolution.
    pub fn granting_records(&self) -> impl Iterator<Item = &Principal> {
        std::iter::once(&self.primary).chain(
            self.secondary
                .iter()
                .filter(|principal| principal.is_active()),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roleward_core::{AppResult, IdentitySource};

    use super::{LogicalPrincipal, Principal};
    use crate::role::SystemRole;

    fn record(source: IdentitySource, role: SystemRole) -> AppResult<Principal> {
        Principal::new(
            format!("{source}-1"),
            source,
            "wallet1abc",
            role.id(),
            Utc::now(),
        )
    }

    #[test]
    fn merge_prefers_unified_role_regardless_of_order() -> AppResult<()> {
        let legacy = record(IdentitySource::Legacy, SystemRole::PlatformAdmin)?;
        let unified = record(IdentitySource::Unified, SystemRole::Creator)?;

        let merged = LogicalPrincipal::merged(legacy.clone(), unified.clone());
        assert_eq!(merged.role(), &SystemRole::Creator.id());

        let merged = LogicalPrincipal::merged(unified, legacy);
        assert_eq!(merged.role(), &SystemRole::Creator.id());
        assert_eq!(
            merged.secondary().map(Principal::identity_source),
            Some(IdentitySource::Legacy)
        );
        Ok(())
    }

    #[test]
    fn inactive_secondary_is_skipped_for_grants() -> AppResult<()> {
        let legacy = record(IdentitySource::Legacy, SystemRole::PlatformAdmin)?.with_active(false);
        let unified = record(IdentitySource::Unified, SystemRole::Creator)?;

        let merged = LogicalPrincipal::merged(legacy, unified);
        assert_eq!(merged.granting_records().count(), 1);
        Ok(())
    }

    #[test]
    fn blank_bound_identity_is_rejected() {
        let result = Principal::new(
            "p-1",
            IdentitySource::Legacy,
            " ",
            SystemRole::User.id(),
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
