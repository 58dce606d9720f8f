use std::sync::Arc;

use axum::{Extension, Json};

use roleward_application::AdminConsole;

use crate::dto::OverviewResponse;
use crate::error::ApiResult;

pub async fn overview_handler(
    Extension(console): Extension<Arc<AdminConsole>>,
) -> ApiResult<Json<OverviewResponse>> {
    let overview = console.overview().await?;

    Ok(Json(OverviewResponse::from(overview)))
}
