//! Historical weather queries.

use chrono::NaiveDateTime;
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, JsonValue, Statement, Value};

use crate::common::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::validate::validate_timestamp;
use crate::weather::{Granularity, compose, tz};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// List readings or aggregates for a station over `[start_time, end_time]`.
///
/// The session's time zone is re-set on the borrowed connection before
/// anything else runs, because the previous borrower may have left another
/// zone behind. The zone literal goes through `quote_literal` on the server
/// side rather than into the statement text.
///
/// Raw granularity, or a timezone observationally identical to the server
/// default across the range, is served from the pre-aggregated tables;
/// anything else re-aggregates the raw table into local-timezone buckets.
pub async fn list(
    state: &AppState,
    station_ref: &str,
    fields: u32,
    granularity: Granularity,
    timezone: &str,
    start_time: &str,
    end_time: &str,
) -> ApiResult<JsonValue> {
    if !validate_timestamp(start_time) || !validate_timestamp(end_time) {
        return Err(ApiError::InvalidParams);
    }
    let start = NaiveDateTime::parse_from_str(start_time, TIMESTAMP_FORMAT)
        .map_err(|_| ApiError::InvalidParams)?;
    let end = NaiveDateTime::parse_from_str(end_time, TIMESTAMP_FORMAT)
        .map_err(|_| ApiError::InvalidParams)?;

    let conn = state.pool.acquire().await;

    let quoted = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT quote_literal($1)",
            vec![timezone.into()],
        ))
        .await?;
    let escaped = quoted
        .first()
        .and_then(|row| row.try_get_by::<String, _>(0_usize).ok())
        .ok_or_else(|| {
            ApiError::Database(DbErr::Custom("quote_literal produced no value".to_owned()))
        })?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Postgres,
        format!("SET TIME ZONE {escaped}"),
    ))
    .await?;

    let same_timezone =
        tz::same_offsets_over_range(start, end, timezone, &state.config.default_timezone);

    let (sql, values): (String, Vec<Value>) =
        if !same_timezone && granularity != Granularity::Raw {
            (
                compose::dynamic_query(fields),
                vec![
                    station_ref.into(),
                    start.into(),
                    end.into(),
                    granularity.as_str().into(),
                ],
            )
        } else {
            (
                compose::static_query(fields, granularity),
                vec![station_ref.into(), start.into(), end.into()],
            )
        };

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            values,
        ))
        .await?;

    if rows.is_empty() {
        return Err(ApiError::Forbidden);
    }

    db::rows_to_json(&rows, false)
}
