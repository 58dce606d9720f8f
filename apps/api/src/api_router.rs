use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use roleward_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::handlers::{access, health, overview, roles, session};
use crate::middleware::{self, CONNECTED_IDENTITY_HEADER, IDENTITY_SOURCE_HEADER};
use crate::state::AppState;

pub fn build_router<Store: SessionStore + Clone>(
    app_state: AppState,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError> {
    let cors_layer = build_cors_layer(app_state.frontend_url.as_str())?;

    let admin_routes = Router::new()
        .route("/api/catalog", get(access::catalog_handler))
        .route(
            "/api/permissions/{permission}",
            get(access::check_permission_handler),
        )
        .route("/api/surfaces", get(access::surfaces_handler))
        .route("/api/session", get(session::session_state_handler))
        .route("/api/session/login", post(session::login_handler))
        .route("/api/session/logout", post(session::logout_handler))
        .route("/api/session/refresh", post(session::refresh_handler))
        .route(
            "/api/roles",
            get(roles::list_roles_handler).post(roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(roles::get_role_handler)
                .put(roles::update_role_details_handler)
                .delete(roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            put(roles::update_role_permissions_handler),
        )
        .route("/api/role-assignments", post(roles::assign_role_handler))
        .route("/api/overview", get(overview::overview_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::attach_console,
        ));

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(CONNECTED_IDENTITY_HEADER),
            HeaderName::from_static(IDENTITY_SOURCE_HEADER),
        ]))
}

#[cfg(test)]
mod tests;
