//! Session endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::AuthMaterial;
use crate::common::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::sessions;
use crate::validate::validate_uuid;

use super::valid_ref;

/// Cookie lifetime handed out on login, in seconds.
const DEFAULT_SESSION_MAX_AGE: i32 = 3600;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    password: Option<String>,
}

/// `POST /users/{id}/sessions` — login. The plaintext token leaves the
/// server only inside the Set-Cookie header of this response.
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
    body: Bytes,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let req: CreateSessionRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidParams)?;

    let created = sessions::create(
        &state,
        &id,
        req.password.as_deref(),
        &auth,
        DEFAULT_SESSION_MAX_AGE,
    )
    .await?;

    let mut response = (StatusCode::CREATED, Json(created.session)).into_response();
    let cookie = format!(
        "sessiontoken={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        created.token, DEFAULT_SESSION_MAX_AGE
    );
    // The token is URL-safe base64, so the header value is always valid.
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// `GET /users/{id}/sessions` — active sessions of a user.
pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let list = sessions::list(&state, &id, None, &auth).await?;
    Ok((StatusCode::OK, Json(list)).into_response())
}

/// `GET /users/{id}/sessions/{session_id}` — single session.
pub async fn list_one(
    State(state): State<AppState>,
    Path((id, session_id)): Path<(String, String)>,
    auth: AuthMaterial,
) -> ApiResult<Response> {
    if !valid_ref(&id) || !validate_uuid(&session_id) {
        return Err(ApiError::NotFound);
    }
    let session = sessions::list(&state, &id, Some(&session_id), &auth).await?;
    Ok((StatusCode::OK, Json(session)).into_response())
}

/// `DELETE /users/{id}/sessions/{session_id}` — revoke a session.
pub async fn delete(
    State(state): State<AppState>,
    Path((id, session_id)): Path<(String, String)>,
    auth: AuthMaterial,
) -> ApiResult<StatusCode> {
    if !valid_ref(&id) || !validate_uuid(&session_id) {
        return Err(ApiError::NotFound);
    }
    sessions::delete(&state, &id, &session_id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}
