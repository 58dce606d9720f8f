//! Permission catalog.
//!
//! The catalog is the universe every role definition and permission check is
//! validated against. Identifiers are stable transport values and are never
//! reused once published.

use std::collections::BTreeMap;
use std::str::FromStr;

use roleward_core::AppError;
use serde::{Deserialize, Serialize};

/// Functional area a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Platform-wide read surfaces.
    Platform,
    /// Proposal and content lifecycle.
    Content,
    /// User and role administration.
    Users,
    /// Token and treasury operations.
    Financial,
    /// Platform configuration and safety controls.
    System,
}

impl PermissionCategory {
    /// Returns a stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Content => "content",
            Self::Users => "users",
            Self::Financial => "financial",
            Self::System => "system",
        }
    }
}

/// Access level granted by a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Read-only visibility.
    Read,
    /// Create or edit owned resources.
    Write,
    /// Administrative control.
    Admin,
}

impl AccessLevel {
    /// Returns a stable storage value for this access level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

/// Elevation tier held by elevated roles.
///
/// Tiers are ordered: an `Owner` satisfies every `SuperAdmin` requirement but
/// not the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationTier {
    /// Platform super administrators.
    SuperAdmin,
    /// Platform owner.
    Owner,
}

impl ElevationTier {
    /// Returns the stable tier identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Owner => "owner",
        }
    }
}

/// Permissions enforced by the admin permission resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows opening the admin dashboard.
    ViewDashboard,
    /// Allows reading platform analytics.
    ViewAnalytics,
    /// Allows submitting new proposals.
    CreateProposals,
    /// Allows approving or rejecting submitted proposals.
    ApproveProposals,
    /// Allows moderating user generated content.
    ModerateContent,
    /// Allows managing user accounts and their role assignments.
    ManageUsers,
    /// Allows creating, editing and deleting custom roles.
    ManageRoles,
    /// Allows managing platform tokens.
    ManageTokens,
    /// Allows editing platform configuration.
    ManagePlatformConfig,
    /// Allows emergency pause controls and system role edits.
    EmergencyControls,
    /// Allows managing compliance and KYC workflows.
    ManageCompliance,
    /// Allows transferring platform ownership.
    TransferOwnership,
}

/// Permission required to create, edit or delete custom roles.
pub const ROLE_MANAGEMENT_PERMISSION: Permission = Permission::ManageRoles;

/// Permission required to edit the permission set of a system role.
pub const ELEVATED_AUTHORIZATION_PERMISSION: Permission = Permission::EmergencyControls;

/// Permission required to move principals between roles.
pub const ROLE_ASSIGNMENT_PERMISSION: Permission = Permission::ManageUsers;

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewDashboard => "view_dashboard",
            Self::ViewAnalytics => "view_analytics",
            Self::CreateProposals => "create_proposals",
            Self::ApproveProposals => "approve_proposals",
            Self::ModerateContent => "moderate_content",
            Self::ManageUsers => "manage_users",
            Self::ManageRoles => "manage_roles",
            Self::ManageTokens => "manage_tokens",
            Self::ManagePlatformConfig => "manage_platform_config",
            Self::EmergencyControls => "emergency_controls",
            Self::ManageCompliance => "manage_compliance",
            Self::TransferOwnership => "transfer_ownership",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::ViewDashboard,
            Permission::ViewAnalytics,
            Permission::CreateProposals,
            Permission::ApproveProposals,
            Permission::ModerateContent,
            Permission::ManageUsers,
            Permission::ManageRoles,
            Permission::ManageTokens,
            Permission::ManagePlatformConfig,
            Permission::EmergencyControls,
            Permission::ManageCompliance,
            Permission::TransferOwnership,
        ];

        ALL
    }

    /// Returns the catalog category.
    #[must_use]
    pub fn category(&self) -> PermissionCategory {
        match self {
            Self::ViewDashboard | Self::ViewAnalytics => PermissionCategory::Platform,
            Self::CreateProposals | Self::ApproveProposals => PermissionCategory::Content,
            Self::ManageUsers | Self::ManageRoles => PermissionCategory::Users,
            Self::ManageTokens => PermissionCategory::Financial,
            Self::ModerateContent
            | Self::ManagePlatformConfig
            | Self::EmergencyControls
            | Self::ManageCompliance
            | Self::TransferOwnership => PermissionCategory::System,
        }
    }

    /// Returns the catalog access level.
    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        match self {
            Self::ViewDashboard | Self::ViewAnalytics => AccessLevel::Read,
            Self::CreateProposals => AccessLevel::Write,
            _ => AccessLevel::Admin,
        }
    }

    /// Returns the elevation tier this permission is reserved to, if any.
    ///
    /// Reserved permissions are never granted by the generic elevated bypass,
    /// by explicit overrides or by role membership below the tier.
    #[must_use]
    pub fn reserved_tier(&self) -> Option<ElevationTier> {
        match self {
            Self::TransferOwnership => Some(ElevationTier::Owner),
            _ => None,
        }
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|permission| permission.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::UnknownPermission(format!("unknown permission '{value}'")))
    }
}

/// Returns the catalog grouped by category, each group in catalog order.
#[must_use]
pub fn catalog_by_category() -> BTreeMap<PermissionCategory, Vec<Permission>> {
    let mut grouped: BTreeMap<PermissionCategory, Vec<Permission>> = BTreeMap::new();
    for permission in Permission::all() {
        grouped
            .entry(permission.category())
            .or_default()
            .push(*permission);
    }

    grouped
}
