use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use roleward_application::{
    AuthMode, AuthorizationService, IdentityAdapter, OverviewService, RoleRegistryService,
    SessionConfig, SessionService,
};
use roleward_core::{AppError, AppResult, IdentitySource};
use roleward_infrastructure::{
    Argon2CredentialVerifier, InMemoryAuditRepository, InMemoryRoleRepository,
    InMemorySessionStore, PrincipalSeed,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use crate::api_services::build_memory_session_layer;
use crate::consoles::AdminConsoles;
use crate::middleware::CONNECTED_IDENTITY_HEADER;
use crate::state::AppState;

const FRONTEND_URL: &str = "http://localhost:3000";

fn app() -> AppResult<Router> {
    let seed = PrincipalSeed::from_json(
        r#"{"unified": [{"id": "unified-a", "bound_identity": "wallet1a", "role": "super_admin"}]}"#,
    )?;
    let hasher = Argon2CredentialVerifier::new(HashMap::new());
    let verifier = Argon2CredentialVerifier::new(HashMap::from([(
        "wallet1a".to_owned(),
        hasher.hash_secret("secret-a")?,
    )]));

    let roles = Arc::new(InMemoryRoleRepository::new());
    let audit = Arc::new(InMemoryAuditRepository::new());
    let authorization_service = AuthorizationService::new(roles.clone());
    let identity_adapter = IdentityAdapter::new(
        Arc::new(seed.directory(IdentitySource::Legacy)?),
        Arc::new(seed.directory(IdentitySource::Unified)?),
    );

    let consoles = AdminConsoles::new(
        authorization_service.clone(),
        RoleRegistryService::new(
            authorization_service.clone(),
            roles.clone(),
            identity_adapter.clone(),
            audit.clone(),
        ),
        SessionService::new(
            SessionConfig {
                mode: AuthMode::Production,
                ..SessionConfig::default()
            },
            authorization_service.clone(),
            identity_adapter.clone(),
            roles.clone(),
            Arc::new(verifier),
            Arc::new(InMemorySessionStore::new()),
            audit,
        ),
        OverviewService::new(authorization_service, roles, identity_adapter),
    );

    let state = AppState {
        consoles: Arc::new(consoles),
        frontend_url: FRONTEND_URL.to_owned(),
        postgres_pool: None,
        redis_client: None,
    };
    build_router(state, build_memory_session_layer(false))
}

struct Client {
    identity: Option<&'static str>,
    cookie: Option<String>,
}

impl Client {
    fn new(identity: Option<&'static str>) -> Self {
        Self {
            identity,
            cookie: None,
        }
    }

    async fn send(
        &mut self,
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ORIGIN, FRONTEND_URL);
        if let Some(identity) = self.identity {
            builder = builder.header(CONNECTED_IDENTITY_HEADER, identity);
        }
        if let Some(cookie) = self.cookie.as_deref() {
            builder = builder.header(COOKIE, cookie);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = match builder.body(body) {
            Ok(request) => request,
            Err(error) => panic!("invalid test request: {error}"),
        };

        let Ok(response) = app.clone().oneshot(request).await;
        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .ok()
                .and_then(|value| value.split(';').next())
                .map(str::to_owned);
            self.cookie = pair;
        }
        response
    }
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = match axum::body::to_bytes(response.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => panic!("failed to read response body: {error}"),
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(error) => panic!("response body is not json: {error}"),
    }
}

fn role_payload(name: &str) -> Option<Value> {
    Some(json!({ "name": name, "permissions": ["approve_proposals"] }))
}

#[tokio::test]
async fn admin_session_is_bound_to_the_client_that_logged_in() -> Result<(), AppError> {
    let app = app()?;
    let mut admin = Client::new(Some("wallet1a"));

    let login = admin
        .send(
            &app,
            Method::POST,
            "/api/session/login",
            Some(json!({ "credentials": "secret-a" })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    assert!(admin.cookie.is_some());

    let created = admin
        .send(&app, Method::POST, "/api/roles", role_payload("Reviewers"))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let check = admin
        .send(&app, Method::GET, "/api/permissions/emergency_controls", None)
        .await;
    assert_eq!(json_body(check).await["granted"], Value::Bool(true));

    // Same connected identity header, but no cookie from the login.
    let mut other = Client::new(Some("wallet1a"));
    let check = other
        .send(&app, Method::GET, "/api/permissions/emergency_controls", None)
        .await;
    assert_eq!(json_body(check).await["granted"], Value::Bool(false));

    let refused = other
        .send(&app, Method::POST, "/api/roles", role_payload("Intruders"))
        .await;
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let state = other.send(&app, Method::GET, "/api/session", None).await;
    assert_eq!(json_body(state).await["session"], Value::Null);

    let mut anonymous = Client::new(None);
    let refused = anonymous
        .send(&app, Method::DELETE, "/api/roles/reviewers", None)
        .await;
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    let check = anonymous
        .send(&app, Method::GET, "/api/permissions/view_dashboard", None)
        .await;
    assert_eq!(json_body(check).await["granted"], Value::Bool(false));
    Ok(())
}

#[tokio::test]
async fn logout_releases_the_console() -> Result<(), AppError> {
    let app = app()?;
    let mut admin = Client::new(Some("wallet1a"));

    let login = admin
        .send(
            &app,
            Method::POST,
            "/api/session/login",
            Some(json!({ "credentials": "secret-a" })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let logout = admin
        .send(&app, Method::POST, "/api/session/logout", None)
        .await;
    assert_eq!(logout.status(), StatusCode::OK);

    let refused = admin
        .send(&app, Method::POST, "/api/roles", role_payload("Leftovers"))
        .await;
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    Ok(())
}
