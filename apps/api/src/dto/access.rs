use roleward_domain::{GateDecision, Permission, PermissionCategory, Surface};
use serde::Serialize;
use ts_rs::TS;

/// Result of one capability check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub granted: bool,
}

/// Routing decision for the admin entry screen.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-decision-response.ts"
)]
pub struct GateDecisionResponse {
    pub kind: String,
    pub redirect_to: Option<String>,
    pub choices: Vec<String>,
}

/// Surfaces reachable by the current principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/surfaces-response.ts"
)]
pub struct SurfacesResponse {
    pub surfaces: Vec<String>,
    pub decision: GateDecisionResponse,
}

/// One catalog permission with its classification.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/catalog-permission-response.ts"
)]
pub struct CatalogPermissionResponse {
    pub permission: String,
    pub access_level: String,
    pub reserved_to: Option<String>,
}

/// Catalog permissions grouped under one category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/catalog-category-response.ts"
)]
pub struct CatalogCategoryResponse {
    pub category: String,
    pub permissions: Vec<CatalogPermissionResponse>,
}

impl From<GateDecision> for GateDecisionResponse {
    fn from(value: GateDecision) -> Self {
        match value {
            GateDecision::NoAccess => Self {
                kind: "no_access".to_owned(),
                redirect_to: None,
                choices: Vec::new(),
            },
            GateDecision::Redirect(surface) => Self {
                kind: "redirect".to_owned(),
                redirect_to: Some(surface.as_str().to_owned()),
                choices: Vec::new(),
            },
            GateDecision::Chooser(surfaces) => Self {
                kind: "chooser".to_owned(),
                redirect_to: None,
                choices: surface_ids(&surfaces),
            },
        }
    }
}

impl From<Permission> for CatalogPermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission: value.as_str().to_owned(),
            access_level: value.access_level().as_str().to_owned(),
            reserved_to: value.reserved_tier().map(|tier| tier.as_str().to_owned()),
        }
    }
}

impl From<(PermissionCategory, Vec<Permission>)> for CatalogCategoryResponse {
    fn from((category, permissions): (PermissionCategory, Vec<Permission>)) -> Self {
        Self {
            category: category.as_str().to_owned(),
            permissions: permissions
                .into_iter()
                .map(CatalogPermissionResponse::from)
                .collect(),
        }
    }
}

pub fn surface_ids(surfaces: &[Surface]) -> Vec<String> {
    surfaces
        .iter()
        .map(|surface| surface.as_str().to_owned())
        .collect()
}
