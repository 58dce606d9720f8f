use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use roleward_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::permission::{ElevationTier, Permission};

/// Stable role identifier derived from the role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Derives a role id from a display name.
    ///
    /// The name is trimmed and lowercased, and every whitespace run becomes a
    /// single underscore: `"Content Reviewers"` becomes `content_reviewers`.
    pub fn from_name(name: &str) -> AppResult<Self> {
        let normalized = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Parses an already normalized role id.
    pub fn parse(value: &str) -> AppResult<Self> {
        let role_id = Self::from_name(value)?;
        if role_id.0 != value {
            return Err(AppError::Validation(format!(
                "role id '{value}' is not normalized (expected '{}')",
                role_id.0
            )));
        }

        Ok(role_id)
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the elevation tier held by principals with this role.
    #[must_use]
    pub fn elevation_tier(&self) -> Option<ElevationTier> {
        match self.0.as_str() {
            "super_admin" => Some(ElevationTier::SuperAdmin),
            "owner" => Some(ElevationTier::Owner),
            _ => None,
        }
    }
}

impl TryFrom<String> for RoleId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Built-in roles seeded into every registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemRole {
    /// Regular platform user.
    User,
    /// Proposal creator.
    Creator,
    /// Day-to-day platform administrator.
    PlatformAdmin,
    /// Elevated administrator with the generic bypass.
    SuperAdmin,
    /// Platform owner, the highest elevation tier.
    Owner,
}

impl SystemRole {
    /// Returns all system roles, lowest privilege first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::User,
            Self::Creator,
            Self::PlatformAdmin,
            Self::SuperAdmin,
            Self::Owner,
        ]
    }

    /// Returns the stable role id value.
    #[must_use]
    pub fn id_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Creator => "creator",
            Self::PlatformAdmin => "platform_admin",
            Self::SuperAdmin => "super_admin",
            Self::Owner => "owner",
        }
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> RoleId {
        RoleId(self.id_str().to_owned())
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Creator => "Creator",
            Self::PlatformAdmin => "Platform Admin",
            Self::SuperAdmin => "Super Admin",
            Self::Owner => "Owner",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::User => "Regular platform user",
            Self::Creator => "Creates and manages proposals",
            Self::PlatformAdmin => "Reviews proposals, users and compliance",
            Self::SuperAdmin => "Full administrative access",
            Self::Owner => "Platform owner with ownership controls",
        }
    }

    /// Returns the permission set the role is seeded with.
    #[must_use]
    pub fn default_permissions(&self) -> BTreeSet<Permission> {
        match self {
            Self::User => BTreeSet::from([Permission::ViewDashboard]),
            Self::Creator => {
                BTreeSet::from([Permission::ViewDashboard, Permission::CreateProposals])
            }
            Self::PlatformAdmin => BTreeSet::from([
                Permission::ViewDashboard,
                Permission::ViewAnalytics,
                Permission::ApproveProposals,
                Permission::ModerateContent,
                Permission::ManageUsers,
                Permission::ManageCompliance,
            ]),
            Self::SuperAdmin => Permission::all()
                .iter()
                .copied()
                .filter(|permission| permission.reserved_tier().is_none())
                .collect(),
            Self::Owner => Permission::all().iter().copied().collect(),
        }
    }

    /// Builds the seeded role definition.
    #[must_use]
    pub fn definition(&self) -> Role {
        Role {
            id: self.id(),
            name: self.display_name().to_owned(),
            description: self.description().to_owned(),
            permissions: self.default_permissions(),
            is_system: true,
            assigned_count: 0,
        }
    }
}

/// Named bundle of permissions assignable to principals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    description: String,
    permissions: BTreeSet<Permission>,
    is_system: bool,
    assigned_count: u32,
}

impl Role {
    /// Creates a custom role definition from administrator input.
    pub fn custom(
        name: NonEmptyString,
        description: impl Into<String>,
        permissions: BTreeSet<Permission>,
    ) -> AppResult<Self> {
        let id = RoleId::from_name(name.as_str())?;
        ensure_tier_allows(&id, &permissions)?;

        Ok(Self {
            id,
            name: name.as_str().trim().to_owned(),
            description: description.into().trim().to_owned(),
            permissions,
            is_system: false,
            assigned_count: 0,
        })
    }

    /// Rebuilds a role from persisted state.
    pub fn from_parts(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: BTreeSet<Permission>,
        is_system: bool,
        assigned_count: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            permissions,
            is_system,
            assigned_count,
        }
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the granted permissions.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns whether the role is built-in.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns the number of principals currently holding the role.
    #[must_use]
    pub fn assigned_count(&self) -> u32 {
        self.assigned_count
    }

    /// Returns whether the role grants a permission.
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns a copy whose permission set is replaced by `permissions`.
    pub fn with_permissions(&self, permissions: BTreeSet<Permission>) -> AppResult<Self> {
        ensure_tier_allows(&self.id, &permissions)?;

        Ok(Self {
            permissions,
            ..self.clone()
        })
    }

    /// Returns a copy with a new description.
    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into().trim().to_owned(),
            ..self.clone()
        }
    }

    /// Returns a copy with the assignment count moved by `delta`, floored at zero.
    #[must_use]
    pub fn with_assignment_delta(&self, delta: i64) -> Self {
        let next = i64::from(self.assigned_count).saturating_add(delta).max(0);
        Self {
            assigned_count: u32::try_from(next).unwrap_or(u32::MAX),
            ..self.clone()
        }
    }

    /// Returns a copy holding exactly `assigned_count` principals.
    #[must_use]
    pub fn with_assigned_count(&self, assigned_count: u32) -> Self {
        Self {
            assigned_count,
            ..self.clone()
        }
    }

    /// Fails when the role is built-in or still held by principals.
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::ProtectedRole(format!(
                "system role '{}' cannot be deleted",
                self.id
            )));
        }

        if self.assigned_count > 0 {
            return Err(AppError::RoleInUse(format!(
                "role '{}' is still assigned to {} principal(s)",
                self.id, self.assigned_count
            )));
        }

        Ok(())
    }
}

fn ensure_tier_allows(role_id: &RoleId, permissions: &BTreeSet<Permission>) -> AppResult<()> {
    for permission in permissions {
        if let Some(required) = permission.reserved_tier() {
            if role_id.elevation_tier() < Some(required) {
                return Err(AppError::Validation(format!(
                    "permission '{}' is reserved to a higher tier than role '{role_id}'",
                    permission.as_str()
                )));
            }
        }
    }

    Ok(())
}
