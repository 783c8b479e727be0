//! User account operations.

use sea_orm::{ConnectionTrait, DatabaseBackend, JsonValue, Statement, Value};

use crate::auth::{AuthMaterial, passwords, session};
use crate::common::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::validate::{validate_email, validate_name};

const LIST_SQL: &str = "SELECT uuid, username, email, created_at, max_stations, is_admin FROM auth.users \
      WHERE deleted_at IS NULL \
      AND ($1::text IS NULL OR uuid::text = $1::text OR username = $1::text)";

/// List users visible to the caller. A `None` reference lists everyone and
/// requires admin scope; a concrete reference returns that user as a bare
/// object.
pub async fn list(
    state: &AppState,
    user_ref: Option<&str>,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, user_ref, token).await {
        return Err(ApiError::Auth);
    }

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            LIST_SQL,
            vec![Value::from(user_ref.map(str::to_owned))],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    db::rows_to_json(&rows, user_ref.is_some())
}

const INSERT_SQL: &str = "INSERT INTO auth.users (username, email, password) \
      VALUES ($1, $2, $3)";

const CREATED_SQL: &str = "SELECT uuid, username, email, created_at, max_stations, is_admin FROM auth.users \
      WHERE username = $1";

/// Create a user and return the stored row. Uniqueness violations surface
/// as database errors.
pub async fn create(
    state: &AppState,
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> ApiResult<JsonValue> {
    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(ApiError::InvalidParams);
    };
    if !validate_name(username) || !validate_email(email) {
        return Err(ApiError::InvalidParams);
    }

    let hashed = passwords::hash(password.to_owned()).await?;

    let conn = state.pool.acquire().await;
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        INSERT_SQL,
        vec![username.into(), email.into(), hashed.into()],
    ))
    .await?;

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            CREATED_SQL,
            vec![username.into()],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    db::rows_to_json(&rows, true)
}

const DELETE_SQL: &str = "UPDATE auth.users \
      SET deleted_at = now() \
      WHERE (uuid::text = $1 OR username = $1) \
      AND deleted_at IS NULL";

/// Soft-delete a user. Idempotent: deleting an already-deleted or unknown
/// user succeeds without effect.
pub async fn delete(state: &AppState, user_ref: &str, auth: &AuthMaterial) -> ApiResult<()> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        DELETE_SQL,
        vec![user_ref.into()],
    ))
    .await?;

    Ok(())
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub max_stations: Option<i32>,
    pub is_admin: Option<bool>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

const PATCH_SQL: &str = "UPDATE auth.users \
      SET username = COALESCE($2, username), \
          email = COALESCE($3, email), \
          max_stations = COALESCE($4, max_stations), \
          is_admin = COALESCE($5, is_admin), \
          password = COALESCE($6, password) \
      WHERE uuid::text = $1 OR username = $1 \
      RETURNING uuid::text, username, email, max_stations, is_admin, created_at, deleted_at";

const REVOKE_SESSIONS_SQL: &str = "UPDATE auth.user_sessions \
      SET revoked_at = NOW() \
      WHERE user_id = (SELECT user_id FROM auth.users WHERE uuid::text = $1 OR username = $1) \
      AND revoked_at IS NULL";

/// Patch a user. Changing the password requires the current one to verify;
/// `max_stations` and `is_admin` are honoured only for admin callers and
/// silently dropped otherwise. Every active session of the user is revoked
/// afterwards, so new credentials must be re-proven.
pub async fn patch(
    state: &AppState,
    user_ref: &str,
    patch: UserPatch,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };
    if let Some(username) = patch.username.as_deref()
        && !validate_name(username)
    {
        return Err(ApiError::InvalidParams);
    }
    if let Some(email) = patch.email.as_deref()
        && !validate_email(email)
    {
        return Err(ApiError::InvalidParams);
    }

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    let mut hashed_password = None;
    if patch.old_password.is_some() || patch.new_password.is_some() {
        let old = patch.old_password.as_deref().unwrap_or("");
        if !passwords::validate(&*conn, user_ref, old).await {
            return Err(ApiError::Auth);
        }
        let Some(new) = patch.new_password else {
            return Err(ApiError::InvalidParams);
        };
        hashed_password = Some(passwords::hash(new).await?);
    }

    let (max_stations, is_admin) = if session::validate_admin(&*conn, token).await {
        (patch.max_stations, patch.is_admin)
    } else {
        (None, None)
    };

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            PATCH_SQL,
            vec![
                user_ref.into(),
                Value::from(patch.username),
                Value::from(patch.email),
                Value::from(max_stations),
                Value::from(is_admin),
                Value::from(hashed_password),
            ],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }
    let user = db::rows_to_json(&rows, true)?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        REVOKE_SESSIONS_SQL,
        vec![user_ref.into()],
    ))
    .await?;

    Ok(user)
}
