use std::sync::Arc;

use sqlx::PgPool;

use crate::consoles::AdminConsoles;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub consoles: Arc<AdminConsoles>,
    pub frontend_url: String,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}
