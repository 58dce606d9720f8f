use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roleward_core::AppError;
use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::ProtectedRole(_) | AppError::RoleInUse(_) | AppError::DuplicateRole(_) => {
                StatusCode::CONFLICT
            }
            AppError::UnknownPermission(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use roleward_core::AppError;

    use super::ApiError;

    #[test]
    fn registry_rule_violations_are_conflicts() {
        for error in [
            AppError::ProtectedRole("owner".to_owned()),
            AppError::RoleInUse("custom_role_x".to_owned()),
            AppError::DuplicateRole("creator".to_owned()),
        ] {
            assert_eq!(ApiError(error).status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn authentication_and_authorization_are_distinct() {
        assert_eq!(
            ApiError(AppError::Authentication("no session".to_owned())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(AppError::Authorization("missing grant".to_owned())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError(AppError::UnknownPermission("fly".to_owned())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
