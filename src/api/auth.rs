use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{Identity, LoginResult, UserInfo};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ChangeEmailRequest {
    pub new_email: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `Authorization: Bearer <token>` header
///
/// The resolved [`Identity`] is attached to the request extensions for
/// handlers behind this middleware.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(identity) = resolve_identity(&state, &session, &headers).await? {
        tracing::Span::current().record("user_id", &identity.id);
        request.extensions_mut().insert(identity);
        return Ok(next.run(request).await);
    }

    Err(ApiError::unauthorized())
}

/// Resolve the caller identity from session or bearer token, if any.
///
/// Public endpoints use this directly so an authenticated caller gets the
/// wider view while anonymous callers are never rejected. Absent, unknown,
/// and expired tokens all resolve to `None`.
pub async fn resolve_identity(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
) -> Result<Option<Identity>, ApiError> {
    // Session first (fastest path for the web UI).
    if let Ok(Some(user_id)) = session.get::<String>("user_id").await
        && let Ok(Some(user)) = state.store.get_user_by_id(&user_id).await
    {
        return Ok(Some(Identity {
            id: user.id,
            email: user.email,
        }));
    }

    if let Some(token) = extract_bearer(headers) {
        return Ok(state.auth.verify_token(&token).await?);
    }

    Ok(None)
}

/// Extract a bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password, returns a bearer token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state.auth.login(&payload.email, &payload.password).await?;

    // Cookie session for browser clients; API clients use the token.
    session
        .insert("user_id", &result.user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
/// Revoke the presented bearer token (if any) and flush the session.
/// Idempotent: logging out twice is not an error.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if let Some(token) = extract_bearer(&headers) {
        state.auth.logout(&token).await?;
    }

    let _ = session.flush().await;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// GET /auth/me
/// Get current user information (requires authentication)
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state
        .store
        .get_user_by_id(&identity.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(ApiResponse::success(UserInfo {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })))
}

/// POST /auth/change-password
/// Change password (requires current password verification). Every
/// outstanding bearer token for the user is revoked afterwards.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .change_password(
            &identity.id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!("Password changed for user: {}", identity.email);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// POST /auth/change-email
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state
        .auth
        .change_email(&identity.id, &payload.new_email)
        .await?;

    tracing::info!("Email changed for user: {}", identity.id);

    Ok(Json(ApiResponse::success(user)))
}
