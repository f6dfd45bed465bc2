use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::resolve_identity;
use super::{ApiError, ApiResponse, AppState, MessageResponse, PostDto};
use crate::db::{NewPost, PostUpdate};
use crate::services::Identity;

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_image: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_category() -> String {
    "general".to_string()
}

const fn default_published() -> bool {
    true
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub author_image: Option<String>,
    pub published: Option<bool>,
}

/// GET /posts
/// Newest-first. Anonymous callers see published posts only; authenticated
/// callers (session or bearer) see drafts too.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<PostDto>>>, ApiError> {
    let include_unpublished = resolve_identity(&state, &session, &headers)
        .await?
        .is_some();

    let posts = state.store.list_posts(include_unpublished).await?;

    Ok(Json(ApiResponse::success(
        posts.into_iter().map(PostDto::from).collect(),
    )))
}

/// GET /posts/{id}
/// Same visibility rule as the listing: unpublished posts 404 for anonymous
/// callers.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    let include_unpublished = resolve_identity(&state, &session, &headers)
        .await?
        .is_some();

    let post = state
        .store
        .get_post(id, include_unpublished)
        .await?
        .ok_or_else(|| ApiError::post_not_found(id))?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// POST /posts
/// Create a post owned by the caller. Omitted optional fields take their
/// defaults (category "general", tags "", published true).
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    let new_post = NewPost {
        title: payload.title,
        content: payload.content,
        category: payload.category,
        tags: payload.tags,
        image: payload.image,
        author: payload.author,
        author_image: payload.author_image,
        published: payload.published,
        user_id: identity.id,
    };

    let post = state.store.create_post(&new_post).await?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// PUT /posts/{id}
/// Partial update: only fields present in the body change; any update
/// refreshes `updated_at`.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    if let Some(title) = &payload.title
        && title.trim().is_empty()
    {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    if let Some(content) = &payload.content
        && content.trim().is_empty()
    {
        return Err(ApiError::validation("Content cannot be empty"));
    }

    let update = PostUpdate {
        title: payload.title,
        content: payload.content,
        category: payload.category,
        tags: payload.tags,
        image: payload.image,
        author: payload.author,
        author_image: payload.author_image,
        published: payload.published,
    };

    let post = state
        .store
        .update_post(id, &update)
        .await?
        .ok_or_else(|| ApiError::post_not_found(id))?;

    Ok(Json(ApiResponse::success(PostDto::from(post))))
}

/// DELETE /posts/{id}
/// Any authenticated caller may delete any post; ownership is not checked.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state.store.delete_post(id).await?;

    if !deleted {
        return Err(ApiError::post_not_found(id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Post {id} deleted"),
    })))
}
