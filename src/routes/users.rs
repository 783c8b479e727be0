//! User endpoints.

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
use crate::services::users;

use super::valid_ref;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// `POST /users` — public sign-up.
pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let req: CreateUserRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidParams)?;

    let user = users::create(
        &state,
        req.username.as_deref(),
        req.email.as_deref(),
        req.password.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// `GET /users` — full listing, admin scope.
pub async fn list_all(State(state): State<AppState>, auth: AuthMaterial) -> ApiResult<Response> {
    let list = users::list(&state, None, &auth).await?;
    Ok((StatusCode::OK, Json(list)).into_response())
}

/// `GET /users/{id}` — single user by UUID or username.
pub async fn list_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let user = users::list(&state, Some(&id), &auth).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    username: Option<String>,
    email: Option<String>,
    max_stations: Option<i32>,
    is_admin: Option<bool>,
    #[serde(rename = "oldPassword")]
    old_password: Option<String>,
    password: Option<String>,
}

/// `PATCH /users/{id}` — partial update, self or admin scope.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
    body: Bytes,
) -> ApiResult<Response> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    let req: PatchUserRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidParams)?;

    let patch = users::UserPatch {
        username: req.username,
        email: req.email,
        max_stations: req.max_stations,
        is_admin: req.is_admin,
        old_password: req.old_password,
        new_password: req.password,
    };

    let user = users::patch(&state, &id, patch, &auth).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// `DELETE /users/{id}` — soft delete, self or admin scope.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthMaterial,
) -> ApiResult<StatusCode> {
    if !valid_ref(&id) {
        return Err(ApiError::NotFound);
    }
    users::delete(&state, &id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}
