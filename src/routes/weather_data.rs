//! Weather-data endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::common::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::weather_data;
use crate::weather::{Granularity, fields};

use super::valid_ref;

#[derive(Debug, Deserialize)]
pub struct WeatherDataQuery {
    granularity: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    timezone: Option<String>,
    /// Comma-separated column names, e.g. `temperature,humidity`.
    fields: Option<String>,
}

/// `GET /stations/{station}/weather-data` — public historical readings at
/// the requested aggregation level.
pub async fn list(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Query(query): Query<WeatherDataQuery>,
) -> ApiResult<Response> {
    if !valid_ref(&station) {
        return Err(ApiError::NotFound);
    }

    let (Some(timezone), Some(start_time), Some(end_time)) = (
        query.timezone.as_deref(),
        query.start_time.as_deref(),
        query.end_time.as_deref(),
    ) else {
        return Err(ApiError::InvalidParams);
    };

    let fields = match query.fields.as_deref() {
        Some(list) => fields::parse_mask(list).ok_or(ApiError::InvalidParams)?,
        None => 0,
    };
    let granularity = Granularity::parse(query.granularity.as_deref().unwrap_or(""));

    let data = weather_data::list(
        &state,
        &station,
        fields,
        granularity,
        timezone,
        start_time,
        end_time,
    )
    .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
