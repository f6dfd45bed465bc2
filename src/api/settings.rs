//! Singleton document endpoints: landing page, blog settings, global
//! settings. Each is at most one database row holding a JSON document;
//! `GET` falls back to a hard-coded default when no row exists and `POST`
//! upserts in place.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::Identity;

// ============================================================================
// Landing document sub-schema
// ============================================================================

/// Landing document shape. Known fields are typed for validation; unknown
/// fields flow through `extra` so client-owned additions survive a save
/// round-trip.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandingDocument {
    pub hero: HeroBlock,
    pub featured_post_ids: Vec<i32>,
    pub sections: Vec<SectionBlock>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroBlock {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionBlock {
    pub kind: String,
    pub title: String,
    pub body: String,
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn default_landing_document() -> Value {
    json!({
        "hero": {
            "title": "Welcome",
            "subtitle": "",
            "ctaText": "Read the blog",
            "ctaLink": "/blog",
            "image": ""
        },
        "featuredPostIds": [],
        "sections": []
    })
}

fn default_blog_settings() -> Value {
    json!({
        "title": "Blog",
        "description": "",
        "postsPerPage": 9,
        "showAuthor": true
    })
}

fn default_global_settings() -> Value {
    json!({
        "siteName": "Marlin",
        "tagline": "",
        "ai_api_key": ""
    })
}

fn parse_stored(data: &str, which: &str) -> Result<Value, ApiError> {
    serde_json::from_str(data)
        .map_err(|e| ApiError::internal(format!("Stored {which} document is corrupt: {e}")))
}

// ============================================================================
// Landing page
// ============================================================================

/// GET /landing
pub async fn get_landing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let document = match state.store.get_landing().await? {
        Some(row) => parse_stored(&row.data, "landing")?,
        None => default_landing_document(),
    };

    Ok(Json(ApiResponse::success(document)))
}

/// POST /landing
/// Shape-validates against the landing sub-schema, then stores the raw
/// document so unknown fields are preserved.
pub async fn save_landing(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    serde_json::from_value::<LandingDocument>(payload.clone())
        .map_err(|e| ApiError::validation(format!("Invalid landing document: {e}")))?;

    state
        .store
        .save_landing(&payload.to_string(), &identity.id)
        .await?;

    Ok(Json(ApiResponse::success(payload)))
}

// ============================================================================
// Blog settings
// ============================================================================

/// GET /blog-settings
pub async fn get_blog_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let document = match state.store.get_blog_settings().await? {
        Some(row) => parse_stored(&row.data, "blog-settings")?,
        None => default_blog_settings(),
    };

    Ok(Json(ApiResponse::success(document)))
}

/// POST /blog-settings
pub async fn save_blog_settings(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    if !payload.is_object() {
        return Err(ApiError::validation(
            "Blog settings must be a JSON object",
        ));
    }

    state
        .store
        .save_blog_settings(&payload.to_string(), &identity.id)
        .await?;

    Ok(Json(ApiResponse::success(payload)))
}

// ============================================================================
// Global settings
// ============================================================================

/// GET /global-settings
pub async fn get_global_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let document = match state.store.get_global_settings().await? {
        Some(row) => parse_stored(&row.data, "global-settings")?,
        None => default_global_settings(),
    };

    Ok(Json(ApiResponse::success(document)))
}

/// POST /global-settings
pub async fn save_global_settings(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    if !payload.is_object() {
        return Err(ApiError::validation(
            "Global settings must be a JSON object",
        ));
    }

    state
        .store
        .save_global_settings(&payload.to_string(), &identity.id)
        .await?;

    Ok(Json(ApiResponse::success(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_document_preserves_unknown_fields() {
        let raw = json!({
            "hero": { "title": "Hi", "theme": "dark" },
            "featuredPostIds": [1, 2],
            "announcement": "New!"
        });

        let document: LandingDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(document.hero.title, "Hi");
        assert_eq!(document.featured_post_ids, vec![1, 2]);
        assert!(document.extra.contains_key("announcement"));
        assert!(document.hero.extra.contains_key("theme"));

        let round_tripped = serde_json::to_value(&document).unwrap();
        assert_eq!(round_tripped["announcement"], "New!");
        assert_eq!(round_tripped["hero"]["theme"], "dark");
    }

    #[test]
    fn landing_document_rejects_bad_shapes() {
        let raw = json!({ "featuredPostIds": ["not-a-number"] });
        assert!(serde_json::from_value::<LandingDocument>(raw).is_err());
    }
}
