use roleward_application::{AuthMode, Session, SessionOutcome};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::roles::permission_ids;

/// Incoming payload for admin login.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub credentials: Option<String>,
}

/// API representation of the admin session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub principal_id: String,
    pub bound_identity: String,
    pub role_id: String,
    pub permissions: Vec<String>,
    pub created_at: String,
    pub last_active_at: String,
}

/// Session returned by login and refresh.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-outcome-response.ts"
)]
pub struct SessionOutcomeResponse {
    pub session: SessionResponse,
    pub persistence_warning: Option<String>,
}

/// Current session state and login mode.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-state-response.ts"
)]
pub struct SessionStateResponse {
    pub mode: String,
    pub session: Option<SessionResponse>,
}

/// Logout result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/logout-response.ts"
)]
pub struct LogoutResponse {
    pub persistence_warning: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(value: Session) -> Self {
        Self {
            principal_id: value.principal_id,
            bound_identity: value.bound_identity,
            role_id: value.role.to_string(),
            permissions: permission_ids(&value.permissions),
            created_at: value.created_at.to_rfc3339(),
            last_active_at: value.last_active_at.to_rfc3339(),
        }
    }
}

impl From<SessionOutcome> for SessionOutcomeResponse {
    fn from(value: SessionOutcome) -> Self {
        Self {
            session: SessionResponse::from(value.session),
            persistence_warning: value.persistence_warning,
        }
    }
}

pub fn mode_label(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Production => "production",
        AuthMode::Demo => "demo",
    }
}
