use roleward_application::{AdminOverview, LoadWarning};
use serde::Serialize;
use ts_rs::TS;

use super::roles::{PrincipalResponse, RoleResponse};

/// Supporting data that failed to load.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/load-warning-response.ts"
)]
pub struct LoadWarningResponse {
    pub subsystem: String,
    pub message: String,
}

/// Admin overview with partial-failure warnings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/overview-response.ts"
)]
pub struct OverviewResponse {
    pub roles: Vec<RoleResponse>,
    pub legacy_principals: Vec<PrincipalResponse>,
    pub unified_principals: Vec<PrincipalResponse>,
    pub warnings: Vec<LoadWarningResponse>,
}

impl From<LoadWarning> for LoadWarningResponse {
    fn from(value: LoadWarning) -> Self {
        Self {
            subsystem: value.subsystem.to_owned(),
            message: value.message,
        }
    }
}

impl From<AdminOverview> for OverviewResponse {
    fn from(value: AdminOverview) -> Self {
        Self {
            roles: value.roles.into_iter().map(RoleResponse::from).collect(),
            legacy_principals: value
                .legacy_principals
                .into_iter()
                .map(PrincipalResponse::from)
                .collect(),
            unified_principals: value
                .unified_principals
                .into_iter()
                .map(PrincipalResponse::from)
                .collect(),
            warnings: value
                .warnings
                .into_iter()
                .map(LoadWarningResponse::from)
                .collect(),
        }
    }
}
