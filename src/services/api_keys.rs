//! API-key lifecycle operations.
//!
//! Keys mirror sessions: same token material, same hash-only storage, plus
//! a typed role and an owning station.

use sea_orm::{ConnectionTrait, DatabaseBackend, JsonValue, Statement, Value};

use crate::auth::{AuthMaterial, session, tokens};
use crate::common::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::validate::validate_name;

/// Role granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyType {
    WeatherUpload,
    StationsManagement,
    StationsControl,
}

impl ApiKeyType {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weather_upload" => Some(Self::WeatherUpload),
            "stations_management" => Some(Self::StationsManagement),
            "stations_control" => Some(Self::StationsControl),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeatherUpload => "weather_upload",
            Self::StationsManagement => "stations_management",
            Self::StationsControl => "stations_control",
        }
    }
}

const CREATE_SQL: &str = "INSERT INTO auth.api_keys (user_id, name, api_key, api_key_type, station_id, expires_at) \
      SELECT \
        u.user_id, \
        $3, \
        $4, \
        $5, \
        s.station_id, \
        NULL \
      FROM auth.users u \
      JOIN stations.stations s ON s.user_id = u.user_id \
      WHERE (u.uuid::text = $1 OR u.username = $1) \
        AND (s.uuid::text = $2 OR s.name = $2) \
      RETURNING \
        uuid, \
        name, \
        api_key_type, \
        created_at, \
        expires_at, \
        $2::text AS station_uuid, \
        $6::text AS api_key";

/// Create a key bound to a user and one of their stations. The RETURNING
/// clause is the only place the plaintext key ever appears.
pub async fn create(
    state: &AppState,
    user_ref: &str,
    name: Option<&str>,
    key_type: Option<&str>,
    station_ref: Option<&str>,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };
    let (Some(name), Some(key_type), Some(station_ref)) = (name, key_type, station_ref) else {
        return Err(ApiError::InvalidParams);
    };
    if !validate_name(name) {
        return Err(ApiError::InvalidParams);
    }
    let Some(key_type) = ApiKeyType::parse(key_type) else {
        return Err(ApiError::InvalidParams);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    let minted = tokens::mint();

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            CREATE_SQL,
            vec![
                user_ref.into(),
                station_ref.into(),
                name.into(),
                minted.hash.into(),
                key_type.as_str().into(),
                minted.plaintext.into(),
            ],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    db::rows_to_json(&rows, true)
}

const LIST_SQL: &str = "SELECT \
        k.uuid, \
        k.name, \
        k.api_key_type, \
        s.name AS station_id, \
        k.created_at, \
        k.expires_at, \
        k.revoked_at \
      FROM auth.api_keys k \
      JOIN auth.users u ON k.user_id = u.user_id \
      LEFT JOIN stations.stations s ON k.station_id = s.station_id \
      WHERE (k.expires_at IS NULL OR k.expires_at > NOW()) \
        AND k.revoked_at IS NULL \
        AND (u.uuid::text = $1::text OR u.username::text = $1::text) \
        AND ($2::text IS NULL OR k.uuid::text = $2::text OR k.name::text = $2::text)";

/// List the active keys of `user_ref`, optionally narrowed to one key by
/// UUID or name (returned as a bare object). The plaintext is never part of
/// the projection.
pub async fn list(
    state: &AppState,
    user_ref: &str,
    key_ref: Option<&str>,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };

    let conn = state.pool.acquire().await;
    if !session::validate(&*conn, Some(user_ref), token).await {
        return Err(ApiError::Auth);
    }

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            LIST_SQL,
            vec![user_ref.into(), Value::from(key_ref.map(str::to_owned))],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    db::rows_to_json(&rows, key_ref.is_some())
}

const REVOKE_SQL: &str = "UPDATE auth.api_keys \
      SET revoked_at = now() \
      WHERE (uuid::text = $1 OR name = $1)";

/// Revoke one key by UUID or name. Idempotent.
pub async fn delete(
    state: &AppState,
    user_ref: &str,
    key_ref: &str,
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
        vec![key_ref.into()],
    ))
    .await?;

    Ok(())
}
