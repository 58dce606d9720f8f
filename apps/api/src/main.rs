//! Roleward admin API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod consoles;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use roleward_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, RoleStoreConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let postgres_pool = match &config.role_store {
        RoleStoreConfig::Postgres { database_url } => {
            Some(api_services::connect_postgres(database_url).await?)
        }
        RoleStoreConfig::Memory => None,
    };

    if config.migrate_only {
        if postgres_pool.is_some() {
            info!("database migrations applied successfully");
        } else {
            info!("ROLE_STORE is memory, no migrations to apply");
        }
        return Ok(());
    }

    let app_state = api_services::build_app_state(&config, postgres_pool).await?;
    let app = match app_state.postgres_pool.clone() {
        Some(pool) => {
            let session_layer =
                api_services::build_postgres_session_layer(pool, config.session_cookie_secure)
                    .await?;
            api_router::build_router(app_state, session_layer)?
        }
        None => {
            let session_layer =
                api_services::build_memory_session_layer(config.session_cookie_secure);
            api_router::build_router(app_state, session_layer)?
        }
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "roleward-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
