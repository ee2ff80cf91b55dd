use axum::{
    Json,
    extract::{Multipart, Query, State},
};

use super::super::AppState;
use super::super::error::ApiError;
use crate::core::llm::MediaBlob;

#[derive(serde::Deserialize)]
pub struct AssessmentQuery {
    user_id: String,
    risk_type: String,
}

pub async fn video_risk_assessment_endpoint(
    State(state): State<AppState>,
    Query(params): Query<AssessmentQuery>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = read_upload(&mut multipart).await?;
    if payload.data.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    let outcome = state
        .pipeline
        .run(&params.user_id, &params.risk_type, payload)
        .await?;

    Ok(Json(serde_json::json!({
        "session_id": outcome.session_id,
        "result": outcome.summary,
    })))
}

/// Pull the uploaded video out of the multipart body. Accepts the first
/// field named `file` or carrying a filename; content type falls back to a
/// filename-based guess.
async fn read_upload(multipart: &mut Multipart) -> Result<MediaBlob, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| {
                field
                    .file_name()
                    .map(|n| mime_guess::from_path(n).first_or_octet_stream().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?
            .to_vec();

        return Ok(MediaBlob { mime_type, data });
    }

    Err(ApiError::BadRequest(
        "missing file field in multipart body".to_string(),
    ))
}
