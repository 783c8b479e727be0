//! Station operations.

use sea_orm::{ConnectionTrait, DatabaseBackend, JsonValue, Statement, Value};

use crate::auth::{AuthMaterial, session};
use crate::common::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::validate::validate_name;

const CREATE_SQL: &str = "WITH new_station AS ( \
      INSERT INTO stations.stations (user_id, name, location) \
      SELECT u.user_id, $1, ST_GeogFromText($2) \
      FROM auth.users u \
      WHERE u.uuid::text = $3 \
        AND (u.max_stations = -1 OR (SELECT COUNT(*) \
            FROM stations.stations s \
            WHERE s.user_id = u.user_id AND s.deleted_at IS NULL) < u.max_stations) \
      RETURNING uuid, name, \
                ST_X(location::geometry) AS lon, \
                ST_Y(location::geometry) AS lat, \
                COALESCE(ST_Z(location::geometry), 0) AS alt \
    ) \
    SELECT uuid, name, lon, lat, alt FROM new_station";

/// Create a station owned by the session's user. The statement inserts
/// nothing when the owner's quota of non-deleted stations is already used
/// up, which surfaces as FORBIDDEN.
pub async fn create(
    state: &AppState,
    name: Option<&str>,
    lon: f64,
    lat: f64,
    alt: f64,
    auth: &AuthMaterial,
) -> ApiResult<JsonValue> {
    let Some(token) = auth.session_token.as_deref() else {
        return Err(ApiError::Auth);
    };
    let Some(name) = name else {
        return Err(ApiError::Auth);
    };
    if !validate_name(name) {
        return Err(ApiError::InvalidParams);
    }

    let conn = state.pool.acquire().await;
    let Some(user_uuid) = session::user_uuid(&*conn, token).await else {
        return Err(ApiError::Auth);
    };

    let location = format!("SRID=4326;POINTZ({lon} {lat} {alt})");

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            CREATE_SQL,
            vec![name.into(), location.into(), user_uuid.into()],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::Forbidden);
    }

    db::rows_to_json(&rows, true)
}

const LIST_SQL: &str = "SELECT \
      uuid, \
      name, \
      ST_X(location::geometry) AS lon, \
      ST_Y(location::geometry) AS lat, \
      COALESCE(ST_Z(location::geometry), 0) AS alt \
      FROM stations.stations \
      WHERE deleted_at IS NULL \
      AND ($1::text IS NULL OR uuid::text = $1 OR name = $1)";

/// List stations, or look one up by UUID or name. Public.
pub async fn list(state: &AppState, station_ref: Option<&str>) -> ApiResult<JsonValue> {
    let conn = state.pool.acquire().await;

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            LIST_SQL,
            vec![Value::from(station_ref.map(str::to_owned))],
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::Forbidden);
    }

    db::rows_to_json(&rows, station_ref.is_some())
}
