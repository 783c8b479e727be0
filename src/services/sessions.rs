//! Session lifecycle operations.

use sea_orm::{ConnectionTrait, DatabaseBackend, JsonValue, Statement, Value};

use crate::auth::{AuthMaterial, passwords, session, tokens};
use crate::common::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};

/// Outcome of a successful login: the stored session row and the plaintext
/// token, which exists only long enough to be written into the Set-Cookie
/// header.
pub struct CreatedSession {
    pub session: JsonValue,
    pub token: String,
}

const INSERT_SQL: &str = "INSERT INTO auth.user_sessions \
      (user_id, session_token, expires_at, ip_address, user_agent) \
      SELECT u.user_id, $1, now() + $3 * interval '1 second', $4, $5 \
      FROM auth.users u \
      WHERE u.uuid::text = $2 OR u.username = $2";

const CREATED_SQL: &str = "SELECT uuid, created_at, last_seen_at, expires_at, reauth_at, ip_address, user_agent \
      FROM auth.user_sessions \
      WHERE session_token = $1";

/// Create a session for `user_ref` after a password proof. Only the token
/// hash is inserted; the peer address and user agent are recorded with it.
pub async fn create(
    state: &AppState,
    user_ref: &str,
    password: Option<&str>,
    auth: &AuthMaterial,
    max_age_secs: i32,
) -> ApiResult<CreatedSession> {
    let Some(password) = password else {
        return Err(ApiError::Auth);
    };

    let conn = state.pool.acquire().await;
    if !passwords::validate(&*conn, user_ref, password).await {
        return Err(ApiError::Auth);
    }

    let minted = tokens::mint();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        INSERT_SQL,
        vec![
            minted.hash.clone().into(),
            user_ref.into(),
            max_age_secs.into(),
            auth.peer_ip.clone().into(),
            Value::from(auth.user_agent.clone()),
        ],
    ))
    .await?;

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            CREATED_SQL,
            vec![minted.hash.into()],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(CreatedSession {
        session: db::rows_to_json(&rows, true)?,
        token: minted.plaintext,
    })
}

const LIST_SQL: &str = "SELECT s.created_at, \
      s.last_seen_at, s.expires_at, s.reauth_at, s.ip_address, \
      s.user_agent, s.uuid \
      FROM auth.user_sessions s \
      JOIN auth.users u ON s.user_id = u.user_id \
      WHERE s.expires_at > NOW() \
        AND s.revoked_at IS NULL \
        AND (u.uuid::text = $1::text OR u.username = $1::text) \
        AND ($2::text IS NULL OR s.uuid::text = $2::text)";

/// List the active sessions of `user_ref`, optionally narrowed to one
/// session UUID (returned as a bare object).
pub async fn list(
    state: &AppState,
    user_ref: &str,
    session_uuid: Option<&str>,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::InvalidParams);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            LIST_SQL,
            vec![
                user_ref.into(),
                Value::from(session_uuid.map(str::to_owned)),
            ],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    db::rows_to_json(&rows, session_uuid.is_some())
}

const REVOKE_SQL: &str = "UPDATE auth.user_sessions \
      SET revoked_at = now() \
      WHERE (uuid::text = $1)";

/// Revoke one session. Idempotent.
pub async fn delete(
    state: &AppState,
    user_ref: &str,
    session_uuid: &str,
    auth: &AuthMaterial,
) -> ApiResult<()> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        REVOKE_SQL,
        vec![session_uuid.into()],
    ))
    .await?;

    Ok(())
}
