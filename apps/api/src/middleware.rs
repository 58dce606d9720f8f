use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use roleward_application::AdminConsole;
use roleward_core::{AppError, ConnectedIdentity, IdentitySource};
use tower_sessions::Session;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

pub const CONNECTED_IDENTITY_HEADER: &str = "x-connected-identity";
pub const IDENTITY_SOURCE_HEADER: &str = "x-identity-source";
pub const SESSION_CONSOLE_KEY: &str = "admin_console_id";

/// Resolves the caller's admin console from its cookie session and feeds the
/// connected identity headers into it before the handler runs, so an
/// identity change invalidates the session first.
///
/// A first request carrying an identity opens a console and binds it to the
/// cookie. Requests with neither get a detached console holding no session.
pub async fn attach_console(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = connected_identity(request.headers())?;
    let console_id = session
        .get::<String>(SESSION_CONSOLE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read console id: {error}")))?;

    let console: Arc<AdminConsole> = match (console_id, identity.is_some()) {
        (Some(console_id), _) => state.consoles.open_with(console_id.as_str()).await,
        (None, true) => {
            let (console_id, console) = state.consoles.open().await;
            session
                .insert(SESSION_CONSOLE_KEY, &console_id)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist console id: {error}"))
                })?;
            console
        }
        (None, false) => state.consoles.detached(),
    };

    if let Some(identity) = identity {
        let has_session = console.connect(identity).await;
        debug!(has_session, "connected identity applied");
    }

    request.extensions_mut().insert(console);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Authorization("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Authorization("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn connected_identity(headers: &HeaderMap) -> Result<Option<ConnectedIdentity>, AppError> {
    let Some(value) = headers.get(CONNECTED_IDENTITY_HEADER) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|error| {
        AppError::Validation(format!("invalid {CONNECTED_IDENTITY_HEADER} header: {error}"))
    })?;

    let source = match headers.get(IDENTITY_SOURCE_HEADER) {
        Some(source) => source
            .to_str()
            .map_err(|error| {
                AppError::Validation(format!("invalid {IDENTITY_SOURCE_HEADER} header: {error}"))
            })?
            .parse::<IdentitySource>()?,
        None => IdentitySource::Unified,
    };

    ConnectedIdentity::new(value, source).map(Some)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
