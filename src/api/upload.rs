use axum::{
    Json,
    extract::{Multipart, State},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, UploadResponse};

/// POST /upload/image
/// Accepts a multipart body with an `image` field, stores it under a
/// collision-free key, and returns the public URL. Storage faults surface
/// as 502 through the error taxonomy.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let field_content_type = field.content_type().map(str::to_string);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(ApiError::validation("Uploaded file is empty"));
        }

        let name = format!("{}.{}", Uuid::new_v4(), sanitize_extension(&file_name));

        let content_type = field_content_type.unwrap_or_else(|| {
            mime_guess::from_path(&name)
                .first_or_octet_stream()
                .to_string()
        });

        state
            .storage
            .put(&name, bytes.to_vec(), &content_type)
            .await?;

        let url = state.storage.public_url(&name);

        return Ok(Json(ApiResponse::success(UploadResponse { url })));
    }

    Err(ApiError::validation("Multipart field 'image' is required"))
}

/// Reduce a client-supplied filename to a safe storage extension. The name
/// itself is discarded; only an alphanumeric extension survives.
fn sanitize_extension(file_name: &str) -> String {
    let ext: String = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() { "bin".to_string() } else { ext }
}
