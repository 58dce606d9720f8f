use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use roleward_application::{AdminConsole, AssignRoleInput, CreateRoleInput};
use roleward_core::IdentitySource;

use crate::dto::{
    AssignRoleRequest, CreateRoleRequest, PrincipalResponse, RoleResponse,
    UpdateRoleDetailsRequest, UpdateRolePermissionsRequest,
};
use crate::error::ApiResult;

pub async fn list_roles_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = console
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = console.get_role(role_id.as_str()).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = console
        .create_role(CreateRoleInput {
            name: payload.name,
            description: payload.description,
            permissions: payload.permissions,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_permissions_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = console
        .update_role_permissions(role_id.as_str(), &payload.permissions)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_details_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleDetailsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = console
        .update_role_details(role_id.as_str(), payload.description.as_str())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    console.delete_role(role_id.as_str()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<PrincipalResponse>> {
    let identity_source = payload.identity_source.parse::<IdentitySource>()?;
    let principal = console
        .assign_role(AssignRoleInput {
            identity_source,
            principal_id: payload.principal_id,
            role_id: payload.role_id,
        })
        .await?;

    Ok(Json(PrincipalResponse::from(principal)))
}
