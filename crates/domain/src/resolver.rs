//! Pure permission resolution.
//!
//! The resolver is total: every question has a boolean answer, unknown
//! permission ids included. Role lookups go through a [`RoleTable`] snapshot
//! taken by the caller, so the resolver itself never caches registry state.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::permission::{ElevationTier, Permission};
use crate::principal::{LogicalPrincipal, Principal};
use crate::role::{Role, RoleId};
use crate::surface::{NamedCapability, Surface, SurfaceGuard};

/// Role definitions keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    roles: BTreeMap<RoleId, Role>,
}

impl RoleTable {
    /// Returns the role with the given id.
    #[must_use]
    pub fn get(&self, role_id: &RoleId) -> Option<&Role> {
        self.roles.get(role_id)
    }

    /// Returns the number of roles in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether the table holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<Role> for RoleTable {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self {
            roles: iter
                .into_iter()
                .map(|role| (role.id().clone(), role))
                .collect(),
        }
    }
}

/// Decision function over a principal and the role table.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    roles: &'a RoleTable,
}

impl<'a> PermissionResolver<'a> {
    /// Creates a resolver over a role table snapshot.
    #[must_use]
    pub fn new(roles: &'a RoleTable) -> Self {
        Self { roles }
    }

    /// Returns whether the principal holds the permission.
    ///
    /// Absent or inactive principals are denied. Permissions reserved to an
    /// elevation tier are granted only to principals holding that tier or a
    /// higher one. Other permissions are granted to any elevated principal,
    /// then by explicit overrides, then by role membership, checking the
    /// other identity source's record last.
    #[must_use]
    pub fn check(&self, principal: Option<&LogicalPrincipal>, permission: Permission) -> bool {
        let Some(principal) = principal.filter(|principal| principal.is_active()) else {
            return false;
        };

        let tier = principal.elevation_tier();
        if let Some(required) = permission.reserved_tier() {
            return tier >= Some(required);
        }

        if tier.is_some() {
            return true;
        }

        principal
            .granting_records()
            .any(|record| self.record_grants(record, permission))
    }

    /// Same as [`Self::check`] for a transport permission id.
    ///
    /// Ids outside the catalog resolve to `false`.
    #[must_use]
    pub fn check_id(&self, principal: Option<&LogicalPrincipal>, permission_id: &str) -> bool {
        Permission::from_str(permission_id)
            .map(|permission| self.check(principal, permission))
            .unwrap_or(false)
    }

    /// Materializes every permission the principal currently holds.
    #[must_use]
    pub fn effective_permissions(
        &self,
        principal: Option<&LogicalPrincipal>,
    ) -> BTreeSet<Permission> {
        Permission::all()
            .iter()
            .copied()
            .filter(|permission| self.check(principal, *permission))
            .collect()
    }

    /// Returns whether the principal holds any elevation tier.
    #[must_use]
    pub fn is_elevated(&self, principal: Option<&LogicalPrincipal>) -> bool {
        principal
            .filter(|principal| principal.is_active())
            .is_some_and(|principal| principal.elevation_tier().is_some())
    }

    /// Returns whether the principal holds the owner tier.
    #[must_use]
    pub fn is_owner(&self, principal: Option<&LogicalPrincipal>) -> bool {
        principal
            .filter(|principal| principal.is_active())
            .is_some_and(|principal| principal.elevation_tier() == Some(ElevationTier::Owner))
    }

    /// Evaluates a surface guard.
    #[must_use]
    pub fn passes(&self, principal: Option<&LogicalPrincipal>, guard: SurfaceGuard) -> bool {
        match guard {
            SurfaceGuard::Permission(permission) => self.check(principal, permission),
            SurfaceGuard::ElevatedRole => self.is_elevated(principal),
            SurfaceGuard::Capability(NamedCapability::Owner) => self.is_owner(principal),
            SurfaceGuard::Capability(NamedCapability::RoleAdministration) => {
                self.check(principal, Permission::ManageRoles)
                    || self.check(principal, Permission::EmergencyControls)
            }
        }
    }

    /// Returns the surfaces whose guards pass, in presentation order.
    #[must_use]
    pub fn available_surfaces(&self, principal: Option<&LogicalPrincipal>) -> Vec<Surface> {
        Surface::all()
            .iter()
            .copied()
            .filter(|surface| self.passes(principal, surface.guard()))
            .collect()
    }

    fn record_grants(&self, record: &Principal, permission: Permission) -> bool {
        record.explicit_overrides().contains(&permission)
            || self
                .roles
                .get(record.role())
                .is_some_and(|role| role.grants(permission))
    }
}
