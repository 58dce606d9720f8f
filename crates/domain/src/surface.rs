use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// Administrative entry points gated by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Proposal creation workspace.
    CreatorDashboard,
    /// Proposal approval queue.
    ProposalReview,
    /// User directory and role assignment.
    UserManagement,
    /// Role and permission editor.
    RoleEditor,
    /// Token administration.
    TokenManagement,
    /// Compliance and KYC review.
    Compliance,
    /// Content moderation queue.
    ContentModeration,
    /// Platform configuration.
    PlatformSettings,
    /// Super administrator console.
    SuperAdminConsole,
    /// Owner-only console.
    OwnerConsole,
}

/// Capability predicates that are not a single permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedCapability {
    /// The principal holds the owner elevation tier.
    Owner,
    /// The principal may edit custom or system roles.
    RoleAdministration,
}

/// Declarative guard evaluated for each surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceGuard {
    /// Passes when the principal holds the permission.
    Permission(Permission),
    /// Passes when the principal holds any elevated role.
    ElevatedRole,
    /// Passes when the named capability predicate holds.
    Capability(NamedCapability),
}

impl Surface {
    /// Returns a stable transport value for this surface.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatorDashboard => "creator_dashboard",
            Self::ProposalReview => "proposal_review",
            Self::UserManagement => "user_management",
            Self::RoleEditor => "role_editor",
            Self::TokenManagement => "token_management",
            Self::Compliance => "compliance",
            Self::ContentModeration => "content_moderation",
            Self::PlatformSettings => "platform_settings",
            Self::SuperAdminConsole => "super_admin_console",
            Self::OwnerConsole => "owner_console",
        }
    }

    /// Returns all known surfaces in presentation order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Surface] = &[
            Surface::CreatorDashboard,
            Surface::ProposalReview,
            Surface::UserManagement,
            Surface::RoleEditor,
            Surface::TokenManagement,
            Surface::Compliance,
            Surface::ContentModeration,
            Surface::PlatformSettings,
            Surface::SuperAdminConsole,
            Surface::OwnerConsole,
        ];

        ALL
    }

    /// Returns the guard that decides access to this surface.
    #[must_use]
    pub fn guard(&self) -> SurfaceGuard {
        match self {
            Self::CreatorDashboard => SurfaceGuard::Permission(Permission::CreateProposals),
            Self::ProposalReview => SurfaceGuard::Permission(Permission::ApproveProposals),
            Self::UserManagement => SurfaceGuard::Permission(Permission::ManageUsers),
            Self::RoleEditor => SurfaceGuard::Capability(NamedCapability::RoleAdministration),
            Self::TokenManagement => SurfaceGuard::Permission(Permission::ManageTokens),
            Self::Compliance => SurfaceGuard::Permission(Permission::ManageCompliance),
            Self::ContentModeration => SurfaceGuard::Permission(Permission::ModerateContent),
            Self::PlatformSettings => SurfaceGuard::Permission(Permission::ManagePlatformConfig),
            Self::SuperAdminConsole => SurfaceGuard::ElevatedRole,
            Self::OwnerConsole => SurfaceGuard::Capability(NamedCapability::Owner),
        }
    }
}

/// Routing outcome for the admin entry screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "surfaces", rename_all = "snake_case")]
pub enum GateDecision {
    /// No surface is reachable.
    NoAccess,
    /// Exactly one surface is reachable and the principal is not elevated.
    Redirect(Surface),
    /// Several surfaces are reachable, or the principal is elevated.
    Chooser(Vec<Surface>),
}

impl GateDecision {
    /// Applies the auto-routing rule to the reachable surfaces.
    #[must_use]
    pub fn route(surfaces: Vec<Surface>, is_elevated: bool) -> Self {
        match surfaces.as_slice() {
            [] => Self::NoAccess,
            [only] if !is_elevated => Self::Redirect(*only),
            _ => Self::Chooser(surfaces),
        }
    }
}
