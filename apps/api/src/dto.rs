use serde::Serialize;
use ts_rs::TS;

mod access;
mod overview;
mod roles;
mod session;

pub use access::{
    CatalogCategoryResponse, CatalogPermissionResponse, GateDecisionResponse,
    PermissionCheckResponse, SurfacesResponse, surface_ids,
};
pub use overview::{LoadWarningResponse, OverviewResponse};
pub use roles::{
    AssignRoleRequest, CreateRoleRequest, PrincipalResponse, RoleResponse,
    UpdateRoleDetailsRequest, UpdateRolePermissionsRequest,
};
pub use session::{
    LoginRequest, LogoutResponse, SessionOutcomeResponse, SessionResponse, SessionStateResponse,
    mode_label,
};

/// Status of one backing dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}
