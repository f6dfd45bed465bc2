use axum::{Json, extract::State};
use std::sync::Arc;

use super::{AnalyticsDto, ApiError, ApiResponse, AppState};

/// GET /analytics
/// Post counts come from the database. View and visitor figures are
/// deterministic mock values derived from the counts until real traffic
/// tracking exists.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AnalyticsDto>>, ApiError> {
    let total_posts = state.store.count_posts().await?;
    let published_posts = state.store.count_published_posts().await?;

    let total_views = published_posts * 320 + (total_posts - published_posts) * 40;
    let unique_visitors = total_views / 4;

    Ok(Json(ApiResponse::success(AnalyticsDto {
        total_posts,
        published_posts,
        total_views,
        unique_visitors,
    })))
}
