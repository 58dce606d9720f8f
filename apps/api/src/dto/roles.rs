use roleward_domain::{Permission, Principal, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub permissions: Vec<String>,
}

/// Incoming payload replacing a role's permission set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-permissions-request.ts"
)]
pub struct UpdateRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Incoming payload for role description edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-details-request.ts"
)]
pub struct UpdateRoleDetailsRequest {
    pub description: String,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub identity_source: String,
    pub principal_id: String,
    pub role_id: String,
}

/// API representation of a registry role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub assigned_count: u32,
    pub permissions: Vec<String>,
}

/// API representation of a principal record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-response.ts"
)]
pub struct PrincipalResponse {
    pub principal_id: String,
    pub identity_source: String,
    pub bound_identity: String,
    pub role_id: String,
    pub explicit_overrides: Vec<String>,
    pub is_active: bool,
    pub last_active_at: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id().to_string(),
            name: value.name().to_owned(),
            description: value.description().to_owned(),
            is_system: value.is_system(),
            assigned_count: value.assigned_count(),
            permissions: permission_ids(value.permissions()),
        }
    }
}

impl From<Principal> for PrincipalResponse {
    fn from(value: Principal) -> Self {
        Self {
            principal_id: value.id().to_owned(),
            identity_source: value.identity_source().as_str().to_owned(),
            bound_identity: value.bound_identity().to_owned(),
            role_id: value.role().to_string(),
            explicit_overrides: permission_ids(value.explicit_overrides()),
            is_active: value.is_active(),
            last_active_at: value.last_active_at().to_rfc3339(),
        }
    }
}

pub fn permission_ids<'a>(permissions: impl IntoIterator<Item = &'a Permission>) -> Vec<String> {
    permissions
        .into_iter()
        .map(|permission| permission.as_str().to_owned())
        .collect()
}
