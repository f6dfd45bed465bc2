use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{DraftData, Generation};

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, rename = "currentData")]
    pub current_data: DraftData,
}

#[derive(Deserialize)]
pub struct GenerateImageRequest {
    pub description: String,
}

/// POST /ai/generate
/// Templated content generation keyed on the prompt tag. Requires the AI
/// provider key to be present in global settings.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<Generation>>, ApiError> {
    ensure_provider_key(&state).await?;

    if payload.prompt.is_empty() {
        return Err(ApiError::validation("Prompt is required"));
    }

    let generation = state
        .ai
        .generate(&payload.prompt, &payload.current_data)
        .await;

    Ok(Json(ApiResponse::success(generation)))
}

/// POST /ai/generate-image
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateImageRequest>,
) -> Result<Json<ApiResponse<Generation>>, ApiError> {
    ensure_provider_key(&state).await?;

    if payload.description.is_empty() {
        return Err(ApiError::validation("Description is required"));
    }

    let generation = state.ai.generate_image(&payload.description).await;

    Ok(Json(ApiResponse::success(generation)))
}

/// Generation endpoints stay disabled until an API key is stored in the
/// global-settings document under the configured field.
async fn ensure_provider_key(state: &AppState) -> Result<(), ApiError> {
    let key_field = {
        let config = state.config.read().await;
        config.ai.provider_key_field.clone()
    };

    let configured = match state.store.get_global_settings().await? {
        Some(row) => serde_json::from_str::<Value>(&row.data)
            .ok()
            .and_then(|doc| doc.get(&key_field).and_then(Value::as_str).map(str::to_string))
            .is_some_and(|key| !key.is_empty()),
        None => false,
    };

    if configured {
        Ok(())
    } else {
        Err(ApiError::validation(
            "AI provider API key is not configured",
        ))
    }
}
