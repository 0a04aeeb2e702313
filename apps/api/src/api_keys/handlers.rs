use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api_keys::service::{
    delete_api_key, get_api_key_summary, save_api_key, ApiKeySummary,
};
use crate::errors::AppError;
use crate::models::api_key::KeyType;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct SaveApiKeyRequest {
    pub user_id: Uuid,
    pub api_key: String,
    pub key_type: KeyType,
}

#[derive(Serialize)]
pub struct SaveApiKeyResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct DeleteApiKeyResponse {
    pub success: bool,
    pub deleted: bool,
}

/// GET /api/v1/api-key
pub async fn handle_get_api_key(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ApiKeySummary>, AppError> {
    let summary = get_api_key_summary(state.api_keys.as_ref(), &state.vault, params.user_id).await?;
    Ok(Json(summary))
}

/// PUT /api/v1/api-key
pub async fn handle_save_api_key(
    State(state): State<AppState>,
    Json(req): Json<SaveApiKeyRequest>,
) -> Result<Json<SaveApiKeyResponse>, AppError> {
    save_api_key(
        state.api_keys.as_ref(),
        &state.vault,
        req.user_id,
        &req.api_key,
        req.key_type,
    )
    .await?;
    Ok(Json(SaveApiKeyResponse { success: true }))
}

/// DELETE /api/v1/api-key
pub async fn handle_delete_api_key(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DeleteApiKeyResponse>, AppError> {
    let deleted = delete_api_key(state.api_keys.as_ref(), params.user_id).await?;
    Ok(Json(DeleteApiKeyResponse {
        success: true,
        deleted,
    }))
}
