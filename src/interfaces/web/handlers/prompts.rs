use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::super::AppState;
use super::super::error::ApiError;
use crate::core::store::types::PromptRecord;

#[derive(serde::Deserialize)]
pub struct CreatePromptRequest {
    name: String,
    content: String,
    app_name: Option<String>,
    region: Option<String>,
}

pub async fn create_prompt_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromptRequest>,
) -> Result<(StatusCode, Json<PromptRecord>), ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() || payload.content.is_empty() {
        return Err(ApiError::BadRequest(
            "name and content are required".to_string(),
        ));
    }

    let app_name = payload
        .app_name
        .unwrap_or_else(|| state.scope.app_name.clone());
    let region = payload.region.unwrap_or_else(|| state.scope.region.clone());

    let record = state
        .store
        .create_prompt(&name, &payload.content, &app_name, &region)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(serde::Deserialize)]
pub struct ListPromptsQuery {
    app_name: Option<String>,
    region: Option<String>,
}

pub async fn list_prompts_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListPromptsQuery>,
) -> Result<Json<Vec<PromptRecord>>, ApiError> {
    let records = state
        .store
        .get_all_prompts(query.app_name.as_deref(), query.region.as_deref())
        .await?;
    Ok(Json(records))
}

pub async fn get_prompt_endpoint(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PromptRecord>, ApiError> {
    match state.store.get_prompt_by_id(id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("prompt {} not found", id))),
    }
}

#[derive(serde::Deserialize)]
pub struct UpdatePromptRequest {
    content: String,
}

pub async fn update_prompt_endpoint(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePromptRequest>,
) -> Result<Json<PromptRecord>, ApiError> {
    if payload.content.is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }
    match state.store.update_prompt(id, &payload.content).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("prompt {} not found", id))),
    }
}

pub async fn delete_prompt_endpoint(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_prompt(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("prompt {} not found", id)))
    }
}
