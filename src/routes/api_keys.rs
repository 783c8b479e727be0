//! API-key endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::AuthMaterial;
use crate::common::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::api_keys;

use super::valid_ref;

#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    name: Option<String>,
    api_key_type: Option<String>,
    station_id: Option<String>,
}

/// `POST /users/{id}/api-keys` — create a key; the plaintext appears in
/// this response only.
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
    body: Bytes,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let req: CreateApiKeyRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidParams)?;

    let key = api_keys::create(
        &state,
        &id,
        req.name.as_deref(),
        req.api_key_type.as_deref(),
        req.station_id.as_deref(),
        &auth,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(key)).into_response())
}

/// `GET /users/{id}/api-keys` — active keys of a user.
pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let keys = api_keys::list(&state, &id, None, &auth).await?;
    Ok((StatusCode::OK, Json(keys)).into_response())
}

/// `GET /users/{id}/api-keys/{key_id}` — single key by UUID or name.
pub async fn list_one(
    State(state): State<AppState>,
    Path((id, key_id)): Path<(String, String)>,
    auth: AuthMaterial,
) -> ApiResult<Response> {
    if !valid_ref(&id) || !valid_ref(&key_id) {
        return Err(ApiError::NotFound);
    }
    let key = api_keys::list(&state, &id, Some(&key_id), &auth).await?;
    Ok((StatusCode::OK, Json(key)).into_response())
}

/// `DELETE /users/{id}/api-keys/{key_id}` — revoke a key.
pub async fn delete(
    State(state): State<AppState>,
    Path((id, key_id)): Path<(String, String)>,
    auth: AuthMaterial,
) -> ApiResult<StatusCode> {
    if !valid_ref(&id) || !valid_ref(&key_id) {
        return Err(ApiError::NotFound);
    }
    api_keys::delete(&state, &id, &key_id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}
