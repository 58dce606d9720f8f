use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use roleward_application::AdminConsole;
use roleward_core::AppError;
use tower_sessions::Session;

use crate::dto::{
    LoginRequest, LogoutResponse, SessionOutcomeResponse, SessionResponse, SessionStateResponse,
    mode_label,
};
use crate::error::ApiResult;
use crate::middleware::SESSION_CONSOLE_KEY;
use crate::state::AppState;

pub async fn session_state_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
) -> Json<SessionStateResponse> {
    let session = console.current_session().await;

    Json(SessionStateResponse {
        mode: mode_label(console.mode()).to_owned(),
        session: session.map(SessionResponse::from),
    })
}

pub async fn login_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionOutcomeResponse>> {
    let outcome = console.login(payload.role, payload.credentials).await?;

    // Regenerate the cookie id on privilege change.
    session.cycle_id().await.map_err(|error| {
        AppError::Internal(format!("failed to cycle session id: {error}"))
    })?;

    Ok(Json(SessionOutcomeResponse::from(outcome)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(console): Extension<Arc<AdminConsole>>,
    session: Session,
) -> ApiResult<Json<LogoutResponse>> {
    let persistence_warning = console.logout().await;

    let console_id = session
        .get::<String>(SESSION_CONSOLE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read console id: {error}")))?;
    if let Some(console_id) = console_id {
        state.consoles.close(console_id.as_str()).await;
    }
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear cookie session: {error}")))?;

    Ok(Json(LogoutResponse {
        persistence_warning,
    }))
}

pub async fn refresh_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
) -> ApiResult<Json<SessionOutcomeResponse>> {
    let outcome = console.refresh_session().await?;

    Ok(Json(SessionOutcomeResponse::from(outcome)))
}
