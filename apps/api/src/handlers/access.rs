use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};

use roleward_application::AdminConsole;
use roleward_domain::catalog_by_category;

use crate::dto::{
    CatalogCategoryResponse, GateDecisionResponse, PermissionCheckResponse, SurfacesResponse,
    surface_ids,
};

pub async fn check_permission_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Path(permission): Path<String>,
) -> Json<PermissionCheckResponse> {
    let granted = console.check_permission(permission.as_str()).await;

    Json(PermissionCheckResponse {
        permission,
        granted,
    })
}

pub async fn surfaces_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
) -> Json<SurfacesResponse> {
    let (surfaces, decision) = console.access().await;

    Json(SurfacesResponse {
        surfaces: surface_ids(&surfaces),
        decision: GateDecisionResponse::from(decision),
    })
}

pub async fn catalog_handler() -> Json<Vec<CatalogCategoryResponse>> {
    Json(
        catalog_by_category()
            .into_iter()
            .map(CatalogCategoryResponse::from)
            .collect(),
    )
}
