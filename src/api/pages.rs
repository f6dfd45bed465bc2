use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::resolve_identity;
use super::{ApiError, ApiResponse, AppState, PageDto};

/// GET /pages/{slug}
/// Static page lookup by slug. Unpublished pages are visible to
/// authenticated callers only.
pub async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<PageDto>>, ApiError> {
    let include_unpublished = resolve_identity(&state, &session, &headers)
        .await?
        .is_some();

    let page = state
        .store
        .get_page_by_slug(&slug, include_unpublished)
        .await?
        .ok_or_else(|| ApiError::page_not_found(&slug))?;

    Ok(Json(ApiResponse::success(PageDto::from(page))))
}
